pub mod records;

pub use records::{
    JobRecord, LabeledExample, LanguageRequirement, LanguageSkill, RecordError, TalentRecord,
};
