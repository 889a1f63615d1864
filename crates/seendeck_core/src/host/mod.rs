//! Host application integration points.
//!
//! The host owns the UI and the menu bar; this crate declares one menu
//! action and renders its result through [`HostUi`].

pub mod menu;

use crate::clock::Clock;
use crate::repo::card_repo::CardRepository;
use crate::repo::deck_repo::DeckRepository;
use crate::service::report_service::{EmptyDeckReport, ReportError, ReportService};

/// Host UI surface used by extension actions.
pub trait HostUi {
    /// Shows a modal warning with `message`.
    fn show_warning(&self, message: &str);
}

/// Runs the empty-decks report and shows it in the host's modal.
pub fn run_empty_decks_action<D, C, K>(
    service: &mut ReportService<D, C, K>,
    ui: &impl HostUi,
) -> Result<EmptyDeckReport, ReportError>
where
    D: DeckRepository,
    C: CardRepository,
    K: Clock,
{
    let report = service.build_report()?;
    ui.show_warning(&report.render());
    Ok(report)
}
