use serde::{Deserialize, Serialize};

pub const ADDRESS_FALLBACK: &str = "Address not available";

/// One place result as the search provider returns it. Field names follow
/// the provider's wire format; `cid` sometimes arrives as a bare number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "formattedAddress")]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "userRatingCount", alias = "ratingCount")]
    pub rating_count: Option<u64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de_id")]
    pub cid: Option<String>,
    #[serde(default, alias = "placeId", deserialize_with = "de_id")]
    pub place_id: Option<String>,
}

fn de_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Number(u64),
    }

    Ok(Option::<IdValue>::deserialize(deserializer)?.map(|v| match v {
        IdValue::Text(s) => s,
        IdValue::Number(n) => n.to_string(),
    }))
}

/// Canonical place record used through the rest of the pipeline. Factual
/// fields here are authoritative; later stages only decorate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Place {
    pub title: String,
    pub address: String,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    /// Stable maps link, always constructed.
    pub link: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub categories: Vec<String>,
    pub cid: Option<String>,
    pub place_id: Option<String>,
}

impl Place {
    pub fn from_raw(raw: RawPlace) -> Self {
        let address = raw
            .address
            .as_deref()
            .or(raw.formatted_address.as_deref())
            .or(raw.vicinity.as_deref())
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(ADDRESS_FALLBACK)
            .to_string();

        let link = maps_link(&raw, &address);

        Place {
            title: raw.title,
            address,
            rating: raw.rating,
            rating_count: raw.rating_count,
            link,
            website: raw.website.filter(|w| !w.trim().is_empty()),
            phone: raw.phone.filter(|p| !p.trim().is_empty()),
            categories: raw
                .category
                .into_iter()
                .filter(|c| !c.trim().is_empty())
                .collect(),
            cid: raw.cid,
            place_id: raw.place_id,
        }
    }

    /// Identity key for deduplication: cid, then place_id, then title.
    pub fn unique_id(&self) -> &str {
        self.cid
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.place_id.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.title)
    }
}

// Provider-supplied maps links are unstable, so the link is rebuilt from the
// strongest identifier available.
fn maps_link(raw: &RawPlace, address: &str) -> String {
    if let Some(cid) = raw.cid.as_deref().filter(|s| !s.is_empty()) {
        return format!("https://www.google.com/maps?cid={cid}");
    }
    if let Some(place_id) = raw.place_id.as_deref().filter(|s| !s.is_empty()) {
        return format!(
            "https://www.google.com/maps/search/?api=1&query=Google&query_place_id={place_id}"
        );
    }
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(&format!("{} {}", raw.title, address))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_falls_back_through_alternate_fields() {
        let place = Place::from_raw(RawPlace {
            title: "Cafe".to_string(),
            vicinity: Some("MG Road".to_string()),
            ..Default::default()
        });
        assert_eq!(place.address, "MG Road");

        let place = Place::from_raw(RawPlace {
            title: "Cafe".to_string(),
            ..Default::default()
        });
        assert_eq!(place.address, ADDRESS_FALLBACK);
    }

    #[test]
    fn maps_link_prefers_cid_then_place_id() {
        let place = Place::from_raw(RawPlace {
            title: "Cafe".to_string(),
            cid: Some("123".to_string()),
            place_id: Some("abc".to_string()),
            ..Default::default()
        });
        assert_eq!(place.link, "https://www.google.com/maps?cid=123");

        let place = Place::from_raw(RawPlace {
            title: "Cafe".to_string(),
            place_id: Some("abc".to_string()),
            ..Default::default()
        });
        assert!(place.link.contains("query_place_id=abc"));

        let place = Place::from_raw(RawPlace {
            title: "Corner Cafe".to_string(),
            address: Some("12 Main St".to_string()),
            ..Default::default()
        });
        assert!(place.link.contains("query=Corner%20Cafe%2012%20Main%20St"));
    }

    #[test]
    fn unique_id_preference_order() {
        let mut place = Place {
            title: "Cafe".to_string(),
            cid: Some("123".to_string()),
            place_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(place.unique_id(), "123");

        place.cid = None;
        assert_eq!(place.unique_id(), "abc");

        place.place_id = Some(String::new());
        assert_eq!(place.unique_id(), "Cafe");
    }

    #[test]
    fn numeric_cid_deserializes_as_string() {
        let raw: RawPlace =
            serde_json::from_str(r#"{"title": "Cafe", "cid": 8273645}"#).unwrap();
        assert_eq!(raw.cid.as_deref(), Some("8273645"));
    }
}
