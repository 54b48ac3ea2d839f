pub mod purge;
pub mod reconciler;

pub use reconciler::{PanelOutcome, ReconcileReport, Reconciler, StartupOutcome};
