pub mod command_engine;
