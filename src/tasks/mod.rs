pub mod dispatcher;
pub mod fire;
pub mod resolver;
