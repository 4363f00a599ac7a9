use serde::{Deserialize, Serialize};

/// A single diary record, serialized exactly as it is persisted:
/// `{id, title, location, date, desc, image}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub date: String, // YYYY-MM-DD when entered locally, feed data is taken as-is
    pub desc: String,
    #[serde(default)]
    pub image: Option<String>, // data:<mime>;base64,<payload>
}

/// Values for a new entry. `id` is generated by the store unless supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub id: Option<i64>,
    pub title: String,
    pub location: String,
    pub date: String,
    pub desc: String,
    pub image: Option<String>,
}

/// Partial update of an entry. `None` keeps the stored value, which for
/// `image` means the previous image is retained unless a new one is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub desc: Option<String>,
    pub image: Option<String>,
}

impl EntryDraft {
    pub fn new(title: String, location: String, date: String, desc: String) -> Self {
        Self {
            id: None,
            title,
            location,
            date,
            desc,
            image: None,
        }
    }

    pub fn into_entry(self, id: i64) -> Entry {
        Entry {
            id,
            title: self.title,
            location: self.location,
            date: self.date,
            desc: self.desc,
            image: self.image,
        }
    }
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.location.is_none()
            && self.date.is_none()
            && self.desc.is_none()
            && self.image.is_none()
    }

    /// Apply the patch in place. The id is never touched.
    pub fn apply_to(self, entry: &mut Entry) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(location) = self.location {
            entry.location = location;
        }
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(desc) = self.desc {
            entry.desc = desc;
        }
        if let Some(image) = self.image {
            entry.image = Some(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Entry {
        Entry {
            id: 7,
            title: "Kyoto".to_string(),
            location: "Japan".to_string(),
            date: "2024-03-01".to_string(),
            desc: "Cherry blossoms".to_string(),
            image: Some("data:image/png;base64,AAAA".to_string()),
        }
    }

    #[test]
    fn serializes_with_desc_and_null_image() {
        let mut entry = sample();
        entry.image = None;
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "title": "Kyoto",
                "location": "Japan",
                "date": "2024-03-01",
                "desc": "Cherry blossoms",
                "image": null
            })
        );
    }

    #[test]
    fn entries_without_image_field_still_load() {
        let raw = r#"{"id":1,"title":"t","location":"l","date":"2024-01-01","desc":"d"}"#;
        let entry: Entry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.image, None);
    }

    #[test]
    fn patch_without_image_keeps_image() {
        let mut entry = sample();
        EntryPatch {
            location: Some("Osaka".to_string()),
            ..Default::default()
        }
        .apply_to(&mut entry);
        assert_eq!(entry.location, "Osaka");
        assert_eq!(entry.image.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn patch_with_image_replaces_it() {
        let mut entry = sample();
        EntryPatch {
            image: Some("data:image/jpeg;base64,BBBB".to_string()),
            ..Default::default()
        }
        .apply_to(&mut entry);
        assert_eq!(entry.image.as_deref(), Some("data:image/jpeg;base64,BBBB"));
        assert_eq!(entry.id, 7);
    }
}
