//! Structured record type and its on-disk framing
//!
//! A record is an ordered mapping of sixteen named fields to string values,
//! derived from exactly one raw document. Field order is fixed; downstream
//! consumers assume positional alignment.

/// Field names, in persisted column order
pub const FIELD_NAMES: [&str; 16] = [
    "animeTitle",
    "animeType",
    "animeNumEpisode",
    "releaseDate",
    "endDate",
    "animeNumMembers",
    "animeScore",
    "animeUsers",
    "animeRank",
    "animePopularity",
    "animeDescription",
    "animeRelated",
    "animeCharacters",
    "animeVoices",
    "animeStaff",
    "Url",
];

/// Derived field map for one target
///
/// All values are strings, cleaned but otherwise verbatim from the source
/// document; numeric interpretation happens downstream (see
/// [`StructuredRecord::score_value`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRecord {
    /// Document title with the site-name suffix stripped
    pub title: String,
    /// Media type ("TV", "Movie", ...)
    pub kind: String,
    /// Episode count as printed
    pub num_episodes: String,
    /// Start of the airing range
    pub release_date: String,
    /// End of the airing range, empty for single dates
    pub end_date: String,
    /// Member count with comma separators stripped
    pub num_members: String,
    /// Leading token of the score field
    pub score: String,
    /// First comma-group of the scoring user count
    pub scoring_users: String,
    /// Rank with its decorator characters stripped
    pub rank: String,
    /// Popularity with its leading decorator stripped
    pub popularity: String,
    /// First description paragraph, tabs removed
    pub description: String,
    /// Related titles as a list literal, empty if none
    pub related: String,
    /// Character names as a list literal
    pub characters: String,
    /// Voice actor names as a list literal
    pub voice_actors: String,
    /// `[name, role]` pairs as a nested list literal, empty if absent
    pub staff: String,
    /// The original target's address
    pub source_address: String,
}

impl StructuredRecord {
    /// Field values in persisted column order
    pub fn values(&self) -> [&str; 16] {
        [
            &self.title,
            &self.kind,
            &self.num_episodes,
            &self.release_date,
            &self.end_date,
            &self.num_members,
            &self.score,
            &self.scoring_users,
            &self.rank,
            &self.popularity,
            &self.description,
            &self.related,
            &self.characters,
            &self.voice_actors,
            &self.staff,
            &self.source_address,
        ]
    }

    /// Serializes the record in its persisted TSV framing
    ///
    /// Header names joined by tabs, immediately followed by the values
    /// joined by tabs. There is deliberately NO newline between the two
    /// rows: the legacy format omits it and downstream consumers depend on
    /// the exact bytes, so it is reproduced here as-is.
    pub fn to_tsv(&self) -> String {
        let mut out = FIELD_NAMES.join("\t");
        out.push_str(&self.values().join("\t"));
        out
    }

    /// The score as a float, with `-1.0` standing in for anything unparsable
    pub fn score_value(&self) -> f64 {
        self.score.parse().unwrap_or(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> StructuredRecord {
        StructuredRecord {
            title: "Fullmetal Alchemist: Brotherhood".to_string(),
            kind: "TV".to_string(),
            num_episodes: "64".to_string(),
            release_date: "Apr 5, 2009".to_string(),
            end_date: "Jul 4, 2010".to_string(),
            num_members: "2905324".to_string(),
            score: "9.11".to_string(),
            scoring_users: "1".to_string(),
            rank: "1".to_string(),
            popularity: "3".to_string(),
            description: "After a horrific alchemy experiment...".to_string(),
            related: "['Fullmetal Alchemist']".to_string(),
            characters: "['Edward Elric', 'Alphonse Elric']".to_string(),
            voice_actors: "['Park, Romi']".to_string(),
            staff: "[['Cook, Justin', 'Producer']]".to_string(),
            source_address: "https://example.com/anime/5114".to_string(),
        }
    }

    #[test]
    fn test_field_order_matches_names() {
        let record = sample_record();
        assert_eq!(record.values().len(), FIELD_NAMES.len());
        assert_eq!(record.values()[0], record.title);
        assert_eq!(record.values()[15], record.source_address);
    }

    #[test]
    fn test_tsv_framing_has_no_newline_between_rows() {
        let record = sample_record();
        let tsv = record.to_tsv();

        assert!(!tsv.contains('\n'));
        // The last header column runs directly into the first value
        assert!(tsv.contains("UrlFullmetal Alchemist: Brotherhood"));
    }

    #[test]
    fn test_tsv_framing_exact_bytes() {
        let record = sample_record();
        let expected = format!(
            "{}{}",
            FIELD_NAMES.join("\t"),
            record.values().join("\t")
        );
        assert_eq!(record.to_tsv(), expected);
    }

    #[test]
    fn test_score_value_parses() {
        let record = sample_record();
        assert_eq!(record.score_value(), 9.11);
    }

    #[test]
    fn test_score_value_sentinel() {
        let mut record = sample_record();
        record.score = "N/A".to_string();
        assert_eq!(record.score_value(), -1.0);
    }
}
