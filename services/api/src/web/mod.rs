pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{
    generate_handler, health_handler, mind_map_handler, notes_handler, quiz_handler,
    slides_handler,
};
