mod convergence;
mod login;

pub use convergence::{ConvergenceTracker, ScrollParams, ScrollStep};
pub use login::{LoginEvent, LoginMachine, LoginState};
