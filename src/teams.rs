pub type TeamId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: TeamId,
    pub full_name: &'static str,
    pub abbreviation: &'static str,
    pub nickname: &'static str,
    pub city: &'static str,
}

const fn team(
    id: TeamId,
    full_name: &'static str,
    abbreviation: &'static str,
    nickname: &'static str,
    city: &'static str,
) -> TeamInfo {
    TeamInfo {
        id,
        full_name,
        abbreviation,
        nickname,
        city,
    }
}

/// Franchise directory keyed by the ids stats.nba.com uses.
pub const NBA_TEAMS: &[TeamInfo] = &[
    team(1610612737, "Atlanta Hawks", "ATL", "Hawks", "Atlanta"),
    team(1610612738, "Boston Celtics", "BOS", "Celtics", "Boston"),
    team(1610612739, "Cleveland Cavaliers", "CLE", "Cavaliers", "Cleveland"),
    team(1610612740, "New Orleans Pelicans", "NOP", "Pelicans", "New Orleans"),
    team(1610612741, "Chicago Bulls", "CHI", "Bulls", "Chicago"),
    team(1610612742, "Dallas Mavericks", "DAL", "Mavericks", "Dallas"),
    team(1610612743, "Denver Nuggets", "DEN", "Nuggets", "Denver"),
    team(1610612744, "Golden State Warriors", "GSW", "Warriors", "Golden State"),
    team(1610612745, "Houston Rockets", "HOU", "Rockets", "Houston"),
    team(1610612746, "Los Angeles Clippers", "LAC", "Clippers", "Los Angeles"),
    team(1610612747, "Los Angeles Lakers", "LAL", "Lakers", "Los Angeles"),
    team(1610612748, "Miami Heat", "MIA", "Heat", "Miami"),
    team(1610612749, "Milwaukee Bucks", "MIL", "Bucks", "Milwaukee"),
    team(1610612750, "Minnesota Timberwolves", "MIN", "Timberwolves", "Minnesota"),
    team(1610612751, "Brooklyn Nets", "BKN", "Nets", "Brooklyn"),
    team(1610612752, "New York Knicks", "NYK", "Knicks", "New York"),
    team(1610612753, "Orlando Magic", "ORL", "Magic", "Orlando"),
    team(1610612754, "Indiana Pacers", "IND", "Pacers", "Indiana"),
    team(1610612755, "Philadelphia 76ers", "PHI", "76ers", "Philadelphia"),
    team(1610612756, "Phoenix Suns", "PHX", "Suns", "Phoenix"),
    team(1610612757, "Portland Trail Blazers", "POR", "Trail Blazers", "Portland"),
    team(1610612758, "Sacramento Kings", "SAC", "Kings", "Sacramento"),
    team(1610612759, "San Antonio Spurs", "SAS", "Spurs", "San Antonio"),
    team(1610612760, "Oklahoma City Thunder", "OKC", "Thunder", "Oklahoma City"),
    team(1610612761, "Toronto Raptors", "TOR", "Raptors", "Toronto"),
    team(1610612762, "Utah Jazz", "UTA", "Jazz", "Utah"),
    team(1610612763, "Memphis Grizzlies", "MEM", "Grizzlies", "Memphis"),
    team(1610612764, "Washington Wizards", "WAS", "Wizards", "Washington"),
    team(1610612765, "Detroit Pistons", "DET", "Pistons", "Detroit"),
    team(1610612766, "Charlotte Hornets", "CHA", "Hornets", "Charlotte"),
];

/// Case-insensitive exact match on the full name.
pub fn resolve(name: &str) -> Option<TeamId> {
    find_team(name).map(|t| t.id)
}

pub fn find_team(name: &str) -> Option<&'static TeamInfo> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }
    NBA_TEAMS
        .iter()
        .find(|t| t.full_name.eq_ignore_ascii_case(needle))
}

pub fn team_names() -> Vec<&'static str> {
    let mut names = NBA_TEAMS.iter().map(|t| t.full_name).collect::<Vec<_>>();
    names.sort_unstable();
    names
}
