//! Startup dataset
//!
//! Five members, one per voice type, all with password `123456`, and five
//! songs each sung by a different member. Loaded once before the service
//! accepts requests.

use tracing::info;

use super::models::{AccessLevel, NewMember, NewSong};
use super::store::Store;
use crate::api::auth::hash_password;
use crate::{Error, Result};

/// Plain-text password shared by every seeded account
pub const SEED_PASSWORD: &str = "123456";

/// What the seed created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub members: usize,
    pub songs: usize,
}

const MEMBERS: [(&str, &str, &str, AccessLevel); 5] = [
    ("João Silva", "Tenor", "joao@banda.com", AccessLevel::Admin),
    ("Maria Santos", "Soprano", "maria@banda.com", AccessLevel::Common),
    ("Pedro Costa", "Baritone", "pedro@banda.com", AccessLevel::Common),
    ("Ana Oliveira", "Contralto", "ana@banda.com", AccessLevel::Common),
    ("Carlos Lima", "Bass", "carlos@banda.com", AccessLevel::Common),
];

// (name, key, version link, lyrics); song i is sung by member i
const SONGS: [(&str, &str, &str, &str); 5] = [
    (
        "Amazing Grace",
        "C",
        "https://youtube.com/watch?v=amazing-grace-c",
        "Amazing grace, how sweet the sound\nThat saved a wretch like me\nI once was lost, but now I'm found\nWas blind, but now I see",
    ),
    (
        "How Great Thou Art",
        "G",
        "https://youtube.com/watch?v=how-great-thou-art-g",
        "O Lord my God, when I in awesome wonder\nConsider all the worlds Thy hands have made\nI see the stars, I hear the rolling thunder\nThy power throughout the universe displayed",
    ),
    (
        "It Is Well With My Soul",
        "D",
        "https://youtube.com/watch?v=it-is-well-d",
        "When peace like a river attendeth my way\nWhen sorrows like sea billows roll\nWhatever my lot, Thou hast taught me to say\nIt is well, it is well with my soul",
    ),
    (
        "Great Is Thy Faithfulness",
        "F",
        "https://youtube.com/watch?v=great-is-thy-faithfulness-f",
        "Great is Thy faithfulness, O God my Father\nThere is no shadow of turning with Thee\nThou changest not, Thy compassions, they fail not\nAs Thou hast been, Thou forever will be",
    ),
    (
        "Be Thou My Vision",
        "A",
        "https://youtube.com/watch?v=be-thou-my-vision-a",
        "Be Thou my vision, O Lord of my heart\nNaught be all else to me, save that Thou art\nThou my best thought, by day or by night\nWaking or sleeping, Thy presence my light",
    ),
];

/// Populate an empty store with the startup dataset
pub async fn seed_store(store: &Store) -> Result<SeedSummary> {
    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| Error::Internal(e.to_string()))?;

    let mut member_ids = Vec::with_capacity(MEMBERS.len());
    for (name, voice_type, email, access_level) in MEMBERS {
        let member = store
            .create_member(NewMember {
                name: name.to_string(),
                voice_type: voice_type.to_string(),
                email: email.to_string(),
                password_hash: password_hash.clone(),
                access_level,
            })
            .await
            .map_err(|e| Error::Internal(format!("Seeding member {}: {}", email, e)))?;
        member_ids.push(member.id);
    }

    let mut songs = 0;
    for ((name, key, version_link, lyrics), soloist_id) in SONGS.into_iter().zip(member_ids.iter())
    {
        store
            .create_song(NewSong {
                name: name.to_string(),
                key: key.to_string(),
                version_link: version_link.to_string(),
                lyrics: lyrics.to_string(),
                soloist_id: *soloist_id,
            })
            .await
            .map_err(|e| Error::Internal(format!("Seeding song {}: {}", name, e)))?;
        songs += 1;
    }

    info!("Seeded {} members and {} songs", member_ids.len(), songs);

    Ok(SeedSummary {
        members: member_ids.len(),
        songs,
    })
}
