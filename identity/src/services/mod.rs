//! Registration services.

pub mod activation;
pub mod onboarding;

pub use activation::{ActivateCommand, ActivationService};
pub use onboarding::{OnboardingService, StartRegistrationCommand};
