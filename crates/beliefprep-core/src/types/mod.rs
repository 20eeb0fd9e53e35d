pub mod dialogue;
pub mod slot_values;

pub use dialogue::{
    BeliefState, DialogueRecord, DomainState, Turn, UserTurn, load_dialogues, read_dialogues,
};
pub use slot_values::SlotValueSet;
