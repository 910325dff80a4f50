//! Activities command for browsing the resolver's identities.

use std::io::Write;

use anyhow::Result;
use ll_core::ActivityRegistry;

pub fn run<W: Write>(
    writer: &mut W,
    registry: &ActivityRegistry,
    category: Option<&str>,
) -> Result<()> {
    let Some(category) = category else {
        for category in registry.categories() {
            let count = registry.by_category(category).len();
            writeln!(writer, "{category} ({count})")?;
        }
        return Ok(());
    };

    let identities = registry.by_category(category);
    if identities.is_empty() {
        anyhow::bail!("unknown category: {category}");
    }

    for identity in identities {
        write!(writer, "{} [{}]", identity.name, identity.reward_type)?;
        if identity.aliases.len() > 1 {
            write!(writer, " aka {}", identity.aliases[1..].join(", "))?;
        }
        if !identity.minions.is_empty() {
            write!(writer, " with {}", identity.minions.join(", "))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
