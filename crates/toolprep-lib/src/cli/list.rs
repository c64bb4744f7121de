use crate::catalog::{ToolDefinition, Variant, definitions};
use crate::error::ToolPrepError;
use crate::utils::{Architecture, arch_matches};
use itertools::Itertools;
use std::fmt::Write as _;

pub fn run_list() -> Result<(), ToolPrepError> {
    print!("{}", format_listing(&definitions(), Architecture::current()));
    Ok(())
}

/// One block per category; tools the host cannot run are marked.
pub fn format_listing(definitions: &[ToolDefinition], architecture: Option<Architecture>) -> String {
    let mut listing = String::new();
    for (category, tools) in &definitions
        .iter()
        .sorted_by_key(|definition| (definition.category, definition.id))
        .chunk_by(|definition| definition.category)
    {
        let _ = writeln!(listing, "{}: {}", category, category.description());
        for definition in tools {
            let mut line = format!("  {:<24} {}", definition.id, definition.description);
            for variant in definition.variants {
                match variant {
                    Variant::Eap => line.push_str(" [--eap]"),
                    Variant::Insiders => line.push_str(" [--insiders]"),
                    Variant::Stable => {}
                }
            }
            if !architecture.is_some_and(|arch| arch_matches(definition.architectures, arch)) {
                line.push_str(" (unsupported on this machine)");
            }
            let _ = writeln!(listing, "{line}");
        }
    }
    listing
}
