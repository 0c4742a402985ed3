use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Some(Language::English),
            "es" | "spa" | "spanish" | "español" | "espanol" => Some(Language::Spanish),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Language::English => Language::Spanish,
            Language::Spanish => Language::English,
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
        }
    }
}

/// Every user-visible string for one language.
#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    pub no_files: &'static str,
    pub no_rows: &'static str,
    pub match_label: &'static str,
    pub half: &'static str,
    pub player: &'static str,
    pub language: &'static str,
    pub first_half: &'static str,
    pub second_half: &'static str,
    pub all: &'static str,
    pub averages: &'static str,
    pub avg_of: &'static str,
    pub date: &'static str,
    pub no_date: &'static str,
    pub total: &'static str,
    pub totals_of: &'static str,
    pub sessions: &'static str,
    pub distance: &'static str,
    pub tempo: &'static str,
    pub hsr: &'static str,
    pub sprint: &'static str,
    pub sprint_count: &'static str,
    pub max_speed: &'static str,
    pub acc: &'static str,
    pub dec: &'static str,
    pub load: &'static str,
    pub rhie: &'static str,
    pub group_load: &'static str,
    pub group_speed: &'static str,
    pub group_accel: &'static str,
    pub group_distances: &'static str,
    pub group_repeated: &'static str,
    pub view_cards: &'static str,
    pub view_bars: &'static str,
    pub view_stacked: &'static str,
    pub view_radar: &'static str,
    pub pdf_title: &'static str,
    pub pdf_file: &'static str,
    pub xlsx_file: &'static str,
    pub pdf_ready: &'static str,
    pub xlsx_ready: &'static str,
    pub groups_unit: &'static str,
    pub players_unit: &'static str,
    pub metrics_unit: &'static str,
    pub sessions_unit: &'static str,
}

pub static ENGLISH: Labels = Labels {
    title: "Match GPS Report",
    no_files: "Pass one or more match CSV files (or a folder) to begin.",
    no_rows: "No rows match the current filters.",
    match_label: "Match",
    half: "Half",
    player: "Player",
    language: "Language",
    first_half: "First Half",
    second_half: "Second Half",
    all: "All",
    averages: "Player(s) Averages",
    avg_of: "Average of",
    date: "Date",
    no_date: "No Date",
    total: "Total",
    totals_of: "Totals of",
    sessions: "Sessions",
    distance: "Total Distance (m)",
    tempo: "Tempo Distance (m)",
    hsr: "HSR Distance (m)",
    sprint: "Sprint Distance (m)",
    sprint_count: "Number of Sprints",
    max_speed: "Max Speed (m/s)",
    acc: "Accelerations (#)",
    dec: "Decelerations (#)",
    load: "Player Load",
    rhie: "RHIE Count",
    group_load: "Load",
    group_speed: "Speed & Intensity",
    group_accel: "Acceleration & Deceleration",
    group_distances: "Distances",
    group_repeated: "Repeated High-Intensity Efforts",
    view_cards: "Cards",
    view_bars: "Bars",
    view_stacked: "Stacked",
    view_radar: "Radar",
    pdf_title: "Team GPS Report",
    pdf_file: "gps_report.pdf",
    xlsx_file: "gps_report.xlsx",
    pdf_ready: "PDF ready",
    xlsx_ready: "Workbook ready",
    groups_unit: "groups",
    players_unit: "players",
    metrics_unit: "metrics",
    sessions_unit: "sessions",
};

pub static SPANISH: Labels = Labels {
    title: "Informe GPS del Partido",
    no_files: "Indique uno o más archivos CSV del partido (o una carpeta) para comenzar.",
    no_rows: "Ninguna fila coincide con los filtros actuales.",
    match_label: "Partido",
    half: "Tiempo",
    player: "Jugador",
    language: "Idioma",
    first_half: "Primer Tiempo",
    second_half: "Segundo Tiempo",
    all: "Todos",
    averages: "Promedios del(los) Jugador(es)",
    avg_of: "Promedio de",
    date: "Fecha",
    no_date: "Sin Fecha",
    total: "Total",
    totals_of: "Totales de",
    sessions: "Sesiones",
    distance: "Distancia Total (m)",
    tempo: "Distancia en Tempo (m)",
    hsr: "Distancia HSR (m)",
    sprint: "Distancia en Sprint (m)",
    sprint_count: "N° de Sprints",
    max_speed: "Velocidad Máxima (m/s)",
    acc: "Aceleraciones (#)",
    dec: "Deceleraciones (#)",
    load: "Carga del Jugador",
    rhie: "Esfuerzos Repetidos Alta Intensidad",
    group_load: "Carga",
    group_speed: "Velocidad e Intensidad",
    group_accel: "Aceleración y Desaceleración",
    group_distances: "Distancias",
    group_repeated: "Esfuerzos Repetidos",
    view_cards: "Tarjetas",
    view_bars: "Barras",
    view_stacked: "Apiladas",
    view_radar: "Radar",
    pdf_title: "Informe GPS del Equipo",
    pdf_file: "informe_gps.pdf",
    xlsx_file: "informe_gps.xlsx",
    pdf_ready: "PDF listo",
    xlsx_ready: "Libro listo",
    groups_unit: "grupos",
    players_unit: "jugadores",
    metrics_unit: "métricas",
    sessions_unit: "sesiones",
};
