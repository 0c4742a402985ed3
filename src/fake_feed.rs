use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;

use crate::ingest::{PERIOD_NAME_COLUMN, PERIOD_NUMBER_COLUMN, PLAYER_NAME_COLUMN};
use crate::metrics::{ALL_METRICS, MetricKey};

pub const DEMO_TEAM: &str = "CD Demo";

pub const DEMO_SQUAD: [&str; 14] = [
    "Ana Ruiz",
    "Bruno Díaz",
    "Carla Méndez",
    "Diego Torres",
    "Elena Vidal",
    "Fabián Soto",
    "Gabriela Ríos",
    "Hugo Navarro",
    "Inés Castro",
    "Javier Molina",
    "Karen Paredes",
    "Luis Herrera",
    "Marta Fuentes",
    "Nicolás Rojas",
];

pub const DEMO_OPPONENTS: [&str; 6] = [
    "CD Rivals",
    "Atlético Norte",
    "Union Sur",
    "Deportivo Costa",
    "Real Montaña",
    "Club Valle",
];

#[derive(Debug, Clone)]
pub struct SyntheticFile {
    pub file_name: String,
    pub contents: String,
}

/// `<team>_<opponent>_<half>_YYYY_MM_DD.csv`, spaces folded to dashes.
pub fn synthetic_file_name(opponent: &str, half: u32, date: NaiveDate) -> String {
    let half_tag = if half == 1 { "1ER" } else { "2DO" };
    format!(
        "{}_{}_{}_{}",
        DEMO_TEAM.replace(' ', "-"),
        opponent.replace(' ', "-"),
        half_tag,
        date.format("%Y_%m_%d.csv")
    )
}

/// One half of one match for the whole squad, in the vendor's semicolon layout.
pub fn synthetic_half_csv<R: Rng>(rng: &mut R, players: &[&str], opponent: &str, half: u32) -> String {
    let half_tag = if half == 1 { "1ER" } else { "2DO" };
    let period_name = format!("{opponent} {half_tag} TIEMPO");

    let mut header = vec![
        PLAYER_NAME_COLUMN.to_string(),
        PERIOD_NAME_COLUMN.to_string(),
        PERIOD_NUMBER_COLUMN.to_string(),
    ];
    // Real exports pad some headers.
    header.extend(ALL_METRICS.iter().map(|m| format!(" {} ", m.column())));

    let mut lines = vec![header.join(";")];
    for player in players {
        let mut fields = vec![player.to_string(), period_name.clone(), half.to_string()];
        let work = rng.gen_range(30.0..45.0);
        let rest = rng.gen_range(2.0..10.0);
        for metric in ALL_METRICS {
            let value = match metric {
                MetricKey::Distance => rng.gen_range(4000.0..6000.0),
                MetricKey::Tempo => rng.gen_range(1500.0..2500.0),
                MetricKey::Hsr => rng.gen_range(300.0..700.0),
                MetricKey::Sprint => rng.gen_range(50.0..250.0),
                MetricKey::SprintCount => f64::from(rng.gen_range(3..16_u32)),
                MetricKey::MaxSpeed => rng.gen_range(6.5..9.5),
                MetricKey::Accelerations | MetricKey::Decelerations => {
                    f64::from(rng.gen_range(10..41_u32))
                }
                MetricKey::PlayerLoad => rng.gen_range(350.0..650.0),
                MetricKey::PeakPlayerLoad => rng.gen_range(8.0..14.0),
                MetricKey::LoadWorkTime => work,
                MetricKey::LoadRestTime => rest,
                MetricKey::LoadWorkRest => work / rest,
                MetricKey::VelocityExertion => rng.gen_range(200.0..400.0),
                MetricKey::VelocityExertionPerMin => rng.gen_range(4.0..9.0),
                MetricKey::AccelerationLoad => rng.gen_range(100.0..200.0),
                MetricKey::AccelerationDensityIndex => rng.gen_range(2.0..4.0),
                MetricKey::Rhie => f64::from(rng.gen_range(1..9_u32)),
            };
            fields.push(format!("{value:.2}"));
        }
        lines.push(fields.join(";"));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Two halves per match, one match a week starting at `first_date`.
pub fn synthetic_season<R: Rng>(rng: &mut R, matches: usize, first_date: NaiveDate) -> Vec<SyntheticFile> {
    let mut out = Vec::with_capacity(matches * 2);
    for idx in 0..matches {
        let opponent = DEMO_OPPONENTS[idx % DEMO_OPPONENTS.len()];
        let date = first_date + ChronoDuration::days(7 * idx as i64);
        // Not everyone plays every half.
        let squad = DEMO_SQUAD
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.85))
            .collect::<Vec<_>>();
        for half in [1, 2] {
            out.push(SyntheticFile {
                file_name: synthetic_file_name(opponent, half, date),
                contents: synthetic_half_csv(rng, &squad, opponent, half),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::ingest::{IngestOptions, parse_session};

    #[test]
    fn synthetic_files_parse_back_into_sessions() {
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        let files = synthetic_season(&mut rng, 2, date);
        assert_eq!(files.len(), 4);

        let first = &files[0];
        assert_eq!(first.file_name, "CD-Demo_CD-Rivals_1ER_2024_03_09.csv");
        let session = parse_session(
            &first.file_name,
            first.contents.as_bytes(),
            &IngestOptions::default(),
        )
        .expect("synthetic csv parses");
        assert_eq!(session.date.parsed(), Some(date));
        assert_eq!(session.match_key.base, "CD Rivals");
        assert_eq!(session.columns.len(), ALL_METRICS.len());
        assert!(session.rows.iter().all(|r| r.period == Some(1)));
    }
}
