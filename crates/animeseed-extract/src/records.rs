//! Typed rows for every seed table.

use animeseed_core::SqlValue;
use animeseed_core::tables;

/// A foreign-key reference from a row to a seeded parent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub table: &'static str,
    pub id: i64,
}

impl Reference {
    pub fn new(table: &'static str, id: i64) -> Self {
        Self { table, id }
    }
}

/// A row that can be rendered into a seed table.
pub trait SeedRow {
    /// Natural key; rows are emitted in ascending key order.
    type Key: Ord + Clone + std::fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Values in the table's column order.
    fn values(&self) -> Vec<SqlValue>;

    /// References to other seeded tables. Lookup ids are not included.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// `anime_<attr>(anime_id, <attr>_id)` junction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimeAttributeRow {
    pub anime_id: i64,
    pub value_id: i64,
}

impl SeedRow for AnimeAttributeRow {
    type Key = (i64, i64);

    fn key(&self) -> Self::Key {
        (self.anime_id, self.value_id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.anime_id.into(), self.value_id.into()]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(tables::ANIME, self.anime_id)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterAnimeWorkRow {
    pub anime_id: i64,
    pub character_id: i64,
    pub character_role_id: i64,
}

impl SeedRow for CharacterAnimeWorkRow {
    type Key = (i64, i64);

    fn key(&self) -> Self::Key {
        (self.anime_id, self.character_id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.anime_id.into(),
            self.character_id.into(),
            self.character_role_id.into(),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new(tables::ANIME, self.anime_id),
            Reference::new(tables::CHARACTER, self.character_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonAnimeWorkRow {
    pub anime_id: i64,
    pub person_id: i64,
    pub position: String,
}

impl SeedRow for PersonAnimeWorkRow {
    type Key = (i64, i64);

    fn key(&self) -> Self::Key {
        (self.anime_id, self.person_id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.anime_id.into(),
            self.person_id.into(),
            self.position.as_str().into(),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new(tables::ANIME, self.anime_id),
            Reference::new(tables::PERSON, self.person_id),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PersonVoiceWorkRow {
    pub person_id: i64,
    pub anime_id: i64,
    pub character_id: i64,
    pub language_id: i64,
}

impl SeedRow for PersonVoiceWorkRow {
    type Key = (i64, i64, i64, i64);

    fn key(&self) -> Self::Key {
        (
            self.person_id,
            self.anime_id,
            self.character_id,
            self.language_id,
        )
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.person_id.into(),
            self.anime_id.into(),
            self.character_id.into(),
            self.language_id.into(),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new(tables::PERSON, self.person_id),
            Reference::new(tables::ANIME, self.anime_id),
            Reference::new(tables::CHARACTER, self.character_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CharacterNicknameRow {
    pub character_id: i64,
    pub nickname: String,
}

impl SeedRow for CharacterNicknameRow {
    type Key = (i64, String);

    fn key(&self) -> Self::Key {
        (self.character_id, self.nickname.clone())
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.character_id.into(), self.nickname.as_str().into()]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(tables::CHARACTER, self.character_id)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PersonAlternateNameRow {
    pub person_id: i64,
    pub alternate_name: String,
}

impl SeedRow for PersonAlternateNameRow {
    type Key = (i64, String);

    fn key(&self) -> Self::Key {
        (self.person_id, self.alternate_name.clone())
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.person_id.into(), self.alternate_name.as_str().into()]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(tables::PERSON, self.person_id)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnimeRecommendationRow {
    pub anime_id: i64,
    pub recommended_anime_id: i64,
}

impl SeedRow for AnimeRecommendationRow {
    type Key = (i64, i64);

    fn key(&self) -> Self::Key {
        (self.anime_id, self.recommended_anime_id)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.anime_id.into(), self.recommended_anime_id.into()]
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new(tables::ANIME, self.anime_id),
            Reference::new(tables::ANIME, self.recommended_anime_id),
        ]
    }
}
