//! Author roster and static catalogs
//!
//! `unicorns.json` lists the site's authors, `roles.json` and
//! `licenses.json` the catalogs they and the posts refer to, and
//! `about.json` free-form site metadata. All four live in the data
//! directory and are read once per build.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::error::ContentError;
use super::image::{ImageMeta, ImageSizer};

pub const ABOUT_FILE: &str = "about.json";
pub const AUTHORS_FILE: &str = "unicorns.json";
pub const ROLES_FILE: &str = "roles.json";
pub const LICENSES_FILE: &str = "licenses.json";

/// An author role, e.g. "developer" or "translator"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub prettyname: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A content license
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub name: String,
    pub license_type: Option<String>,
    pub footer_img: Option<String>,
    pub explain_link: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Social handles as written in the roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Socials {
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub linked_in: Option<String>,
    pub twitch: Option<String>,
    pub dribbble: Option<String>,
    pub website: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Socials {
    /// Reduce URL or `@name` handles to the bare username.
    /// `website` is a full URL and is kept as is.
    pub fn normalized(self) -> Self {
        let normalize = |handle: Option<String>| handle.map(|h| normalize_username(&h));
        Self {
            twitter: normalize(self.twitter),
            github: normalize(self.github),
            linked_in: normalize(self.linked_in),
            twitch: normalize(self.twitch),
            dribbble: normalize(self.dribbble),
            website: self.website,
            extra: self.extra,
        }
    }
}

/// Strip everything up to the last `/` or `@` that is not the final character.
///
/// `https://twitter.com/crutchcorn` and `@crutchcorn` both become `crutchcorn`.
pub fn normalize_username(handle: &str) -> String {
    let handle = handle.trim();
    let last = handle.char_indices().rev().find(|&(i, c)| {
        (c == '/' || c == '@') && i + c.len_utf8() < handle.len()
    });
    match last {
        Some((i, c)) => handle[i + c.len_utf8()..].to_string(),
        None => handle.to_string(),
    }
}

/// An author entry as stored in `unicorns.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthor {
    pub id: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub socials: Socials,
    pub pronouns: Option<String>,
    pub profile_img: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A fully resolved author
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: String,
    pub color: String,
    pub roles: Vec<String>,
    pub socials: Socials,
    pub pronouns: Option<String>,
    pub profile_img: String,
    pub profile_img_meta: ImageMeta,
    pub roles_meta: Vec<Role>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl AuthorProfile {
    /// Build a profile from its roster entry and the values derived from it
    pub fn build(raw: RawAuthor, profile_img_meta: ImageMeta, roles_meta: Vec<Role>) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            first_name: raw.first_name,
            last_name: raw.last_name,
            description: raw.description,
            color: raw.color,
            roles: raw.roles,
            socials: raw.socials.normalized(),
            pronouns: raw.pronouns,
            profile_img: raw.profile_img,
            profile_img_meta,
            roles_meta,
            extra: raw.extra,
        }
    }
}

/// The static catalogs of a site
#[derive(Debug, Clone)]
pub struct Roster {
    pub about: Value,
    pub authors: Vec<Arc<AuthorProfile>>,
    pub roles: Vec<Role>,
    pub licenses: Vec<License>,
}

impl Roster {
    /// Load all catalogs from the data directory, which is served at
    /// `server_dir`.
    ///
    /// With `strict` set, an author listing an unknown role is an error;
    /// otherwise the role is dropped with a warning.
    pub async fn load(
        data_dir: &Path,
        server_dir: &str,
        sizer: &dyn ImageSizer,
        strict: bool,
    ) -> Result<Self, ContentError> {
        let about: Value = read_json(&data_dir.join(ABOUT_FILE)).await?;
        let roles: Vec<Role> = read_json(&data_dir.join(ROLES_FILE)).await?;
        let licenses: Vec<License> = read_json(&data_dir.join(LICENSES_FILE)).await?;
        let authors_path = data_dir.join(AUTHORS_FILE);
        let raw_authors: Vec<RawAuthor> = read_json(&authors_path).await?;

        let mut authors = Vec::with_capacity(raw_authors.len());
        for raw in raw_authors {
            let profile_img_meta =
                ImageMeta::resolve(sizer, &raw.profile_img, data_dir, server_dir).await?;

            let mut roles_meta = Vec::with_capacity(raw.roles.len());
            for role_id in &raw.roles {
                match roles.iter().find(|r| &r.id == role_id) {
                    Some(role) => roles_meta.push(role.clone()),
                    None if strict => {
                        return Err(ContentError::UnresolvedReference {
                            path: authors_path.clone(),
                            kind: "role",
                            id: role_id.clone(),
                        })
                    }
                    None => {
                        tracing::warn!("Author '{}' has unknown role '{}'", raw.id, role_id)
                    }
                }
            }

            authors.push(Arc::new(AuthorProfile::build(
                raw,
                profile_img_meta,
                roles_meta,
            )));
        }

        tracing::debug!(
            "Loaded {} authors, {} roles and {} licenses",
            authors.len(),
            roles.len(),
            licenses.len()
        );

        Ok(Self {
            about,
            authors,
            roles,
            licenses,
        })
    }

    /// First author with the given id
    pub fn author(&self, id: &str) -> Option<&Arc<AuthorProfile>> {
        self.authors.iter().find(|a| a.id == id)
    }

    /// First license with the given id
    pub fn license(&self, id: &str) -> Option<&License> {
        self.licenses.iter().find(|l| l.id == id)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ContentError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| ContentError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
