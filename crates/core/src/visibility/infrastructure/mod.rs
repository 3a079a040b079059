pub mod command_classifier;
