use std::collections::BTreeMap;

use animeseed_core::tables;

use crate::entities::{AnimeRow, AppUserRow, CharacterRow, PersonRow};
use crate::records::{
    AnimeAttributeRow, AnimeRecommendationRow, CharacterAnimeWorkRow, CharacterNicknameRow,
    PersonAlternateNameRow, PersonAnimeWorkRow, PersonVoiceWorkRow,
};

/// Every row of a run, grouped by seed table.
#[derive(Debug, Clone, Default)]
pub struct SeedSet {
    pub anime: BTreeMap<i64, AnimeRow>,
    pub characters: BTreeMap<i64, CharacterRow>,
    pub persons: BTreeMap<i64, PersonRow>,
    pub app_users: BTreeMap<i64, AppUserRow>,
    pub character_nicknames: Vec<CharacterNicknameRow>,
    pub person_alternate_names: Vec<PersonAlternateNameRow>,
    /// Junction rows keyed by junction table name.
    pub attributes: BTreeMap<&'static str, Vec<AnimeAttributeRow>>,
    pub character_works: Vec<CharacterAnimeWorkRow>,
    pub person_works: Vec<PersonAnimeWorkRow>,
    pub voice_works: Vec<PersonVoiceWorkRow>,
    pub recommendations: Vec<AnimeRecommendationRow>,
}

impl SeedSet {
    /// Row count of `table`, zero for tables this set does not hold.
    pub fn row_count(&self, table: &str) -> usize {
        match table {
            tables::ANIME => self.anime.len(),
            tables::CHARACTER => self.characters.len(),
            tables::PERSON => self.persons.len(),
            tables::APP_USER => self.app_users.len(),
            tables::CHARACTER_NICKNAME => self.character_nicknames.len(),
            tables::PERSON_ALTERNATE_NAME => self.person_alternate_names.len(),
            tables::CHARACTER_ANIME_WORK => self.character_works.len(),
            tables::PERSON_ANIME_WORK => self.person_works.len(),
            tables::PERSON_VOICE_WORK => self.voice_works.len(),
            tables::ANIME_RECOMMENDATION => self.recommendations.len(),
            other => self.attributes.get(other).map_or(0, Vec::len),
        }
    }

    pub fn attribute_rows(&self, table: &str) -> &[AnimeAttributeRow] {
        self.attributes.get(table).map_or(&[], Vec::as_slice)
    }
}
