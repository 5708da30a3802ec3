//! Chamber - scripted conversational-flow engine
//!
//! A session drives a scripted dialogue ("process") that alternately emits
//! text and waits for exactly one outstanding user response, while scripts
//! read and write a two-tier (global + local) variable store.

pub mod console;
pub mod gate;
pub mod pacing;
pub mod session;
pub mod surface;
pub mod vars;


pub use gate::{DeliveredEvent, EventGate, EventId, PostOutcome};
pub use pacing::Pacer;
pub use session::{
    ButtonAction, ButtonSpec, Invocation, Methods, Process, ReplyButton, ReplyEffect, Session,
    SessionConfig, SessionError, SessionMode,
};
pub use surface::{Backend, InputKind, InputRequest, NullBackend, PresentationSurface};
pub use vars::{VariableStore, Vars};
