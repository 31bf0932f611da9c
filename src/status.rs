//! Status-bar cause codes and their texts.
//!
//! The conditional experimental mode controller publishes a numeric cause
//! code. [`ConditionalStatus`] is the closed set of codes it can publish;
//! anything else maps to `None` and the status bar shows no status text.

use core::fmt::Write;

use heapless::String;

/// Capacity of a resolved status line.
pub const STATUS_TEXT_CAPACITY: usize = 128;

pub type StatusText = String<STATUS_TEXT_CAPACITY>;

/// Why experimental mode is (or is not) active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionalStatus {
    Ready,
    OverriddenDistance,
    ManualDistance,
    OverriddenLkas,
    ManualLkas,
    OverriddenScreen,
    ManualScreen,
    LeadSpeed,
    Speed,
    TurnSignal,
    Intersection,
    UpcomingTurn,
    Curve,
    StoppedLead,
    SlowerLead,
    ModelStop,
    ForcedStop,
    NoSpeedLimit,
    SpeedLimitSlowdown,
}

/// How the driver can revert a manual change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevertHint {
    LongPressDistance,
    ClickLkas,
    DoubleTapScreen,
}

impl RevertHint {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::LongPressDistance => ". Long press the \"distance\" button to revert",
            Self::ClickLkas => ". Click the \"LKAS\" button to revert",
            Self::DoubleTapScreen => ". Double tap the screen to revert",
        }
    }
}

impl ConditionalStatus {
    /// Map a published cause code.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Ready,
            1 => Self::OverriddenDistance,
            2 => Self::ManualDistance,
            3 => Self::OverriddenLkas,
            4 => Self::ManualLkas,
            5 => Self::OverriddenScreen,
            6 => Self::ManualScreen,
            7 => Self::LeadSpeed,
            8 => Self::Speed,
            9 => Self::TurnSignal,
            10 => Self::Intersection,
            11 => Self::UpcomingTurn,
            12 => Self::Curve,
            13 => Self::StoppedLead,
            14 => Self::SlowerLead,
            15 => Self::ModelStop,
            16 => Self::ForcedStop,
            17 => Self::NoSpeedLimit,
            18 => Self::SpeedLimitSlowdown,
            _ => return None,
        })
    }

    /// The driver overrode the controller's decision.
    pub const fn is_override(self) -> bool {
        matches!(self, Self::OverriddenDistance | Self::OverriddenLkas | Self::OverriddenScreen)
    }

    pub const fn revert_hint(self) -> Option<RevertHint> {
        match self {
            Self::OverriddenDistance | Self::ManualDistance => Some(RevertHint::LongPressDistance),
            Self::OverriddenLkas | Self::ManualLkas => Some(RevertHint::ClickLkas),
            Self::OverriddenScreen | Self::ManualScreen => Some(RevertHint::DoubleTapScreen),
            _ => None,
        }
    }
}

/// Inputs that shape the status text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusContext<'a> {
    pub map_open: bool,
    pub always_on_lateral_active: bool,
    pub show_always_on_lateral: bool,
    pub show_conditional: bool,
    pub conditional_status: Option<ConditionalStatus>,
    pub conditional_limit: f32,
    pub conditional_limit_lead: f32,
    pub speed_unit: &'a str,
    /// Seconds until the model expects to stop, if moving.
    pub model_stop_time: Option<i32>,
}

/// Seconds until the model path ends at the current speed.
///
/// Only meaningful while moving; below 1 display unit there is no estimate.
pub fn model_stop_time(model_length: f32, speed_display: f32, speed_factor: f32) -> Option<i32> {
    if speed_display < 1.0 {
        return None;
    }
    Some((model_length / (speed_display / speed_factor)).round() as i32)
}

/// Resolve the status line for this tick. Empty when nothing applies.
pub fn status_message(ctx: &StatusContext<'_>) -> StatusText {
    let mut text = StatusText::new();

    if ctx.always_on_lateral_active && ctx.show_always_on_lateral {
        text.push_str("Always On Lateral active").ok();
        if !ctx.map_open {
            text.push_str(". Press the \"Cruise Control\" button to disable").ok();
        }
        return text;
    }

    if !ctx.show_conditional {
        return text;
    }
    let Some(status) = ctx.conditional_status else {
        return text;
    };

    write_conditional(&mut text, status, ctx);

    if !ctx.always_on_lateral_active
        && !ctx.map_open
        && !text.is_empty()
        && let Some(hint) = status.revert_hint()
    {
        text.push_str(hint.suffix()).ok();
    }
    text
}

fn write_conditional(text: &mut StatusText, status: ConditionalStatus, ctx: &StatusContext<'_>) {
    use ConditionalStatus as S;

    let stop_phrase = |text: &mut StatusText, prefix: &str| {
        match ctx.model_stop_time {
            Some(secs) if !ctx.map_open && secs >= 1 => {
                write!(text, "{prefix} for the model wanting to stop in {secs} seconds").ok();
            }
            _ => {
                write!(text, "{prefix} to stop").ok();
            }
        };
    };

    match status {
        S::Ready => {
            text.push_str("Conditional Experimental Mode ready").ok();
        }
        S::OverriddenDistance | S::OverriddenLkas | S::OverriddenScreen => {
            text.push_str("Conditional Experimental overridden").ok();
        }
        S::ManualDistance | S::ManualLkas | S::ManualScreen => {
            text.push_str("Experimental Mode manually activated").ok();
        }
        S::LeadSpeed | S::Speed => {
            let limit = if status == S::LeadSpeed { ctx.conditional_limit_lead } else { ctx.conditional_limit };
            if ctx.map_open {
                text.push_str("Experimental Mode activated for low speed").ok();
            } else {
                write!(text, "Experimental Mode activated for speed being less than {limit:.0} {}", ctx.speed_unit)
                    .ok();
            }
        }
        S::TurnSignal => {
            let tail = if ctx.map_open { " signal" } else { " / lane change" };
            write!(text, "Experimental Mode activated for turn{tail}").ok();
        }
        S::Intersection => {
            text.push_str("Experimental Mode activated for intersection").ok();
        }
        S::UpcomingTurn => {
            text.push_str("Experimental Mode activated for upcoming turn").ok();
        }
        S::Curve => {
            text.push_str("Experimental Mode activated for curve").ok();
        }
        S::StoppedLead => {
            text.push_str("Experimental Mode activated for stopped lead").ok();
        }
        S::SlowerLead => {
            text.push_str("Experimental Mode activated for slower lead").ok();
        }
        S::ModelStop => stop_phrase(text, "Experimental Mode activated"),
        S::ForcedStop => stop_phrase(text, "Experimental Mode forced on"),
        S::NoSpeedLimit => {
            text.push_str("Experimental Mode activated due to no speed limit").ok();
        }
        S::SpeedLimitSlowdown => {
            text.push_str("Experimental Mode activated due to SLC slowing down").ok();
        }
    }
}
