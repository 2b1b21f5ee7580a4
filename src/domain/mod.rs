// Domain-specific error types
pub mod errors;

// Trained model description
pub mod metadata;

// Port interfaces
pub mod ports;

// Min-max normalization
pub mod scaler;

// Autoregressive window forecasting
pub mod window;
