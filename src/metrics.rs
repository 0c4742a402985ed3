use serde::{Deserialize, Serialize};

use crate::labels::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKey {
    Distance,
    Tempo,
    Hsr,
    Sprint,
    SprintCount,
    MaxSpeed,
    Accelerations,
    Decelerations,
    PlayerLoad,
    PeakPlayerLoad,
    LoadWorkTime,
    LoadRestTime,
    LoadWorkRest,
    VelocityExertion,
    VelocityExertionPerMin,
    AccelerationLoad,
    AccelerationDensityIndex,
    Rhie,
}

/// Catalogue order; charts are listed in this order.
pub const ALL_METRICS: [MetricKey; 18] = [
    MetricKey::Distance,
    MetricKey::Tempo,
    MetricKey::Hsr,
    MetricKey::Sprint,
    MetricKey::SprintCount,
    MetricKey::MaxSpeed,
    MetricKey::Accelerations,
    MetricKey::Decelerations,
    MetricKey::PlayerLoad,
    MetricKey::PeakPlayerLoad,
    MetricKey::LoadWorkTime,
    MetricKey::LoadRestTime,
    MetricKey::LoadWorkRest,
    MetricKey::VelocityExertion,
    MetricKey::VelocityExertionPerMin,
    MetricKey::AccelerationLoad,
    MetricKey::AccelerationDensityIndex,
    MetricKey::Rhie,
];

/// Distance zones shown in the stacked bar view, slowest first.
pub const DISTANCE_ZONES: [MetricKey; 3] = [MetricKey::Tempo, MetricKey::Hsr, MetricKey::Sprint];

impl MetricKey {
    pub fn column(self) -> &'static str {
        match self {
            MetricKey::Distance => "Work Rate Total Dist",
            MetricKey::Tempo => "Tempo Distance (Gen2)",
            MetricKey::Hsr => "HSR Eff Distance (Gen2)",
            MetricKey::Sprint => "Sprint Eff Distance (Gen2)",
            MetricKey::SprintCount => "Sprint Eff Count (Gen2)",
            MetricKey::MaxSpeed => "Max Velocity",
            MetricKey::Accelerations => "Acc Eff Count (Gen2)",
            MetricKey::Decelerations => "Dec Eff Count (Gen2)",
            MetricKey::PlayerLoad => "Player Load",
            MetricKey::PeakPlayerLoad => "Peak Player Load",
            MetricKey::LoadWorkTime => "Player Load Work Time",
            MetricKey::LoadRestTime => "Player Load Rest Time",
            MetricKey::LoadWorkRest => "Player Load Work:Rest",
            MetricKey::VelocityExertion => "Velocity Exertion",
            MetricKey::VelocityExertionPerMin => "Velocity Exertion Per Min",
            MetricKey::AccelerationLoad => "Acceleration Load",
            MetricKey::AccelerationDensityIndex => "Acceleration Density Index",
            MetricKey::Rhie => "RHIE Total Bouts",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        let name = name.trim();
        ALL_METRICS.iter().copied().find(|m| m.column() == name)
    }

    pub fn label(self, language: Language) -> &'static str {
        let labels = language.labels();
        match self {
            MetricKey::Distance => labels.distance,
            MetricKey::Tempo => labels.tempo,
            MetricKey::Hsr => labels.hsr,
            MetricKey::Sprint => labels.sprint,
            MetricKey::SprintCount => labels.sprint_count,
            MetricKey::MaxSpeed => labels.max_speed,
            MetricKey::Accelerations => labels.acc,
            MetricKey::Decelerations => labels.dec,
            MetricKey::PlayerLoad => labels.load,
            MetricKey::Rhie => labels.rhie,
            // The vendor names for these are shown untranslated in both languages.
            other => other.column(),
        }
    }

    pub fn group(self) -> MetricGroup {
        match self {
            MetricKey::PlayerLoad
            | MetricKey::PeakPlayerLoad
            | MetricKey::LoadWorkTime
            | MetricKey::LoadRestTime
            | MetricKey::LoadWorkRest => MetricGroup::Load,
            MetricKey::MaxSpeed | MetricKey::VelocityExertion | MetricKey::VelocityExertionPerMin => {
                MetricGroup::SpeedIntensity
            }
            MetricKey::Accelerations
            | MetricKey::Decelerations
            | MetricKey::AccelerationLoad
            | MetricKey::AccelerationDensityIndex => MetricGroup::AccelDecel,
            MetricKey::Distance
            | MetricKey::Tempo
            | MetricKey::Hsr
            | MetricKey::Sprint
            | MetricKey::SprintCount => MetricGroup::Distances,
            MetricKey::Rhie => MetricGroup::RepeatedEfforts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricGroup {
    Load,
    SpeedIntensity,
    AccelDecel,
    Distances,
    RepeatedEfforts,
}

pub const ALL_GROUPS: [MetricGroup; 5] = [
    MetricGroup::Load,
    MetricGroup::SpeedIntensity,
    MetricGroup::AccelDecel,
    MetricGroup::Distances,
    MetricGroup::RepeatedEfforts,
];

impl MetricGroup {
    pub fn label(self, language: Language) -> &'static str {
        let labels = language.labels();
        match self {
            MetricGroup::Load => labels.group_load,
            MetricGroup::SpeedIntensity => labels.group_speed,
            MetricGroup::AccelDecel => labels.group_accel,
            MetricGroup::Distances => labels.group_distances,
            MetricGroup::RepeatedEfforts => labels.group_repeated,
        }
    }

    /// Members in card order.
    pub fn metrics(self) -> &'static [MetricKey] {
        match self {
            MetricGroup::Load => &[
                MetricKey::PlayerLoad,
                MetricKey::PeakPlayerLoad,
                MetricKey::LoadWorkTime,
                MetricKey::LoadRestTime,
                MetricKey::LoadWorkRest,
            ],
            MetricGroup::SpeedIntensity => &[
                MetricKey::MaxSpeed,
                MetricKey::VelocityExertion,
                MetricKey::VelocityExertionPerMin,
            ],
            MetricGroup::AccelDecel => &[
                MetricKey::Accelerations,
                MetricKey::Decelerations,
                MetricKey::AccelerationLoad,
                MetricKey::AccelerationDensityIndex,
            ],
            MetricGroup::Distances => &[
                MetricKey::Distance,
                MetricKey::Tempo,
                MetricKey::Hsr,
                MetricKey::Sprint,
                MetricKey::SprintCount,
            ],
            MetricGroup::RepeatedEfforts => &[MetricKey::Rhie],
        }
    }
}
