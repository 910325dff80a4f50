//! Show command for one activity's consolidated totals.

use std::io::Write;

use anyhow::Result;
use ll_core::{ActivityRegistry, RewardType, summarize};
use ll_store::RecordStore;

use crate::Config;
use crate::commands::util::{reward_type_for, write_summary};

pub fn run<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    registry: &ActivityRegistry,
    config: &Config,
    name: &str,
    reward_type: Option<RewardType>,
    json: bool,
) -> Result<()> {
    let reward_type = reward_type_for(registry, name, reward_type);
    let mut group = store.build_group(registry, reward_type, name);
    group.recompute_uniques(config.include_minions);

    let summary = summarize(&group, config.summary_options());
    if json {
        serde_json::to_writer_pretty(&mut *writer, &summary)?;
        writeln!(writer)?;
    } else {
        write_summary(writer, &summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use ll_core::{ItemEntry, Record, UniquesPlacement};

    fn zulrah_store(temp: &std::path::Path) -> RecordStore {
        let store = RecordStore::new(temp);
        store.set_active_player("12345");
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for (kc, items) in [
            (5, vec![ItemEntry::new("Zulrah's scales", 12934, 1, 1000)]),
            (
                6,
                vec![
                    ItemEntry::new("Zulrah's scales", 12934, 2, 1200),
                    ItemEntry::new("Tanzanite fang", 12922, 1, 2000),
                ],
            ),
        ] {
            let record = Record::new("Zulrah", 725, kc, RewardType::Npc, items, at).unwrap();
            assert!(store.append(&record));
        }
        store
    }

    #[test]
    fn show_prints_totals_and_uniques_panel_only() {
        let temp = tempfile::tempdir().unwrap();
        let store = zulrah_store(temp.path());
        let config = Config {
            uniques_placement: UniquesPlacement::UniquesPanel,
            ..Config::default()
        };

        let mut output = Vec::new();
        run(&mut output, &store, ActivityRegistry::builtin(), &config, "zulrah", None, false).unwrap();
        let output = String::from_utf8(output).unwrap();
        let head: Vec<&str> = output.lines().take(7).collect();
        assert_snapshot!(head.join("\n"), @r"
        Zulrah (NPC)
        Kills: 2
        Total value: 5600 gp
        Items:
          Zulrah's scales x3 @ 1200 = 3600
        Uniques:
          [ ] Pet snakeling (0)
        ");
        assert!(output.contains("[x] Tanzanite fang (1)"));
    }

    #[test]
    fn show_json_reports_summary() {
        let temp = tempfile::tempdir().unwrap();
        let store = zulrah_store(temp.path());

        let mut output = Vec::new();
        run(
            &mut output,
            &store,
            ActivityRegistry::builtin(),
            &Config::default(),
            "Zulrah",
            Some(RewardType::Npc),
            true,
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["kills"], 2);
        assert_eq!(parsed["total_value"], 5600);
        assert_eq!(parsed["items"][0]["name"], "Zulrah's scales");
        assert_eq!(parsed["items"][0]["quantity"], 3);
    }
}
