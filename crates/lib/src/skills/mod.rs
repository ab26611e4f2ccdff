//! Skills: discover SKILL.md directories in a source checkout and flatten them into a target root.
//!
//! Discovery covers the `skills/` tree (symlinks resolved) and `.github/plugins/`. Each skill is
//! renamed to the `name` in its frontmatter, with collisions resolved in discovery order.

mod descriptor;
mod flatten;
mod walker;

pub use descriptor::{extract_skill_name, parse_skill_name, DESCRIPTOR_FILE};
pub use flatten::{fallback_name, is_flat_name, Flattener, NameRegistry, SkillRecord};
pub(crate) use flatten::copy_preserving_times;
pub use walker::{directory_names, find_plugin_skills, find_source_skills, SkillEntry, SkillSource};
