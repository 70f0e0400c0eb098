use talon_core::{Checkpoint, Resolution, Target, TargetConfidence};

/// Formats the checkpoint prompt for display on stderr, including the targets
/// accumulated so far so the reviewer decides on evidence.
///
/// Returns the full prompt string with ANSI colors.
pub fn format_checkpoint_prompt(checkpoint: &Checkpoint, targets: &[Target]) -> String {
    let mut prompt = String::new();
    prompt.push_str("\n\x1b[1;37m╔══ MISSION CHECKPOINT ══╗\x1b[0m\n");
    prompt.push_str(&format!("  Mission:  {}\n", checkpoint.mission_id));
    prompt.push_str(&format!("  Reason:   {}\n", checkpoint.reason));
    if targets.is_empty() {
        prompt.push_str("  Targets:  none so far\n");
    } else {
        prompt.push_str(&format!("  Targets:  {}\n", targets.len()));
        for target in targets {
            let label = match target.confidence {
                TargetConfidence::Detected => "\x1b[33mdetected\x1b[0m",
                TargetConfidence::Confirmed => "\x1b[32mconfirmed\x1b[0m",
            };
            prompt.push_str(&format!(
                "    {label} at {:.4}, {:.4}",
                target.position.lat, target.position.lon
            ));
            if let Some(detail) = &target.detail {
                prompt.push_str(&format!(" — {detail}"));
            }
            prompt.push('\n');
        }
    }
    prompt.push_str("\x1b[1;37m╚════════════════════════╝\x1b[0m\n");
    prompt.push_str("  Continue? [y/N]: ");
    prompt
}

/// Parses reviewer input into a resolution. Anything other than an explicit
/// yes rejects: an accidental Enter must never continue a mission.
pub fn parse_resolution_input(input: &str) -> Resolution {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Resolution::Approved,
        _ => Resolution::Rejected,
    }
}

/// Prompts on stderr and reads the decision from stdin.
pub async fn prompt_resolution(checkpoint: &Checkpoint, targets: &[Target]) -> Resolution {
    eprint!("{}", format_checkpoint_prompt(checkpoint, targets));

    let input = tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        input
    })
    .await
    .unwrap_or_default();

    let resolution = parse_resolution_input(&input);
    match resolution {
        Resolution::Approved => eprintln!("  → APPROVED\n"),
        _ => eprintln!("  → REJECTED\n"),
    }
    resolution
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use talon_core::GeoPoint;
    use uuid::Uuid;

    #[test]
    fn test_prompt_lists_targets() {
        let checkpoint = Checkpoint::pending(Uuid::new_v4(), "sar tasks complete");
        let mut target = Target::detected(GeoPoint::new(35.1234, 117.5678), Uuid::new_v4());
        target.confirm(Some("armored vehicle".into()), Uuid::new_v4());

        let prompt = format_checkpoint_prompt(&checkpoint, &[target]);
        assert!(prompt.contains("sar tasks complete"));
        assert!(prompt.contains("confirmed"));
        assert!(prompt.contains("armored vehicle"));
        assert!(prompt.contains("35.1234"));
    }

    #[test]
    fn test_prompt_without_targets() {
        let checkpoint = Checkpoint::pending(Uuid::new_v4(), "review");
        let prompt = format_checkpoint_prompt(&checkpoint, &[]);
        assert!(prompt.contains("none so far"));
    }

    #[test]
    fn test_parse_resolution_input() {
        assert_eq!(parse_resolution_input("y"), Resolution::Approved);
        assert_eq!(parse_resolution_input("YES"), Resolution::Approved);
        assert_eq!(parse_resolution_input("  y  "), Resolution::Approved);
        assert_eq!(parse_resolution_input("n"), Resolution::Rejected);
        assert_eq!(parse_resolution_input(""), Resolution::Rejected);
        assert_eq!(parse_resolution_input("\n"), Resolution::Rejected);
        assert_eq!(parse_resolution_input("maybe"), Resolution::Rejected);
    }
}
