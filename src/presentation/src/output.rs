use colored::{ColoredString, Colorize};
use domain::{FallbackResult, Outcome};

use crate::dialog::DialogRenderer;

/// How an outcome should look on a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Refusal,
    Failure,
    Info,
}

pub fn tone(outcome: &Outcome) -> Tone {
    match outcome {
        Outcome::SetupError | Outcome::HubOffline => Tone::Failure,
        Outcome::Sorry
        | Outcome::UnknownDevice { .. }
        | Outcome::BrightnessBadRequest
        | Outcome::CannotDimWhileOff { .. }
        | Outcome::NotDimmable { .. } => Tone::Refusal,
        Outcome::AlreadyInState { .. }
        | Outcome::SensorReading { .. }
        | Outcome::TrackerLocation { .. }
        | Outcome::Spoken { .. } => Tone::Info,
        _ => Tone::Success,
    }
}

fn paint(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Success => text.green(),
        Tone::Refusal => text.yellow(),
        Tone::Failure => text.red().bold(),
        Tone::Info => text.bright_blue(),
    }
}

pub fn print_outcome(renderer: &DialogRenderer, outcome: &Outcome) {
    tracing::debug!("Speaking {}", outcome.dialog_name());
    let sentence = renderer.render(outcome);
    println!("{}", paint(&sentence, tone(outcome)));
    if outcome.expects_response() {
        println!("{}", "(waiting for your answer)".bright_black());
    }
}

pub fn print_fallback(renderer: &DialogRenderer, result: &FallbackResult) {
    match result {
        FallbackResult::Handled(outcome) => print_outcome(renderer, outcome),
        FallbackResult::Declined => {
            println!("{}", "Home Assistant had no answer for that.".bright_black())
        }
    }
}
