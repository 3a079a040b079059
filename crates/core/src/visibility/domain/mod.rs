pub mod visibility_classifier;
