use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

// OpenRTB 2.6 AuctionType for BidRequest.at. Values >= 500 are reserved for
// exchange-specific auction logic and are accepted as-is.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum AuctionType {
    FirstPrice = 1,
    SecondPricePlus = 2,
    FixedPrice = 3,
}

impl TryFrom<i64> for AuctionType {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, i64> {
        match v {
            1 => Ok(Self::FirstPrice),
            2 => Ok(Self::SecondPricePlus),
            3 => Ok(Self::FixedPrice),
            other => Err(other),
        }
    }
}

impl AuctionType {
    pub fn is_known_code(v: i64) -> bool {
        Self::try_from(v).is_ok() || v >= 500
    }
}

// OpenRTB 2.x media/markup type; doubles as the tag of the ad-format union
// carried by an impression (exactly one of banner/video/audio/native).
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum MediaType {
    Banner = 1,
    Video = 2,
    Audio = 3,
    Native = 4,
}

#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum DeviceType {
    MobileTablet = 1,
    PersonalComputer = 2,
    ConnectedTv = 3,
    Phone = 4,
    Tablet = 5,
    ConnectedDevice = 6,
    SetTopBox = 7,
}

impl TryFrom<i64> for DeviceType {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, i64> {
        match v {
            1 => Ok(Self::MobileTablet),
            2 => Ok(Self::PersonalComputer),
            3 => Ok(Self::ConnectedTv),
            4 => Ok(Self::Phone),
            5 => Ok(Self::Tablet),
            6 => Ok(Self::ConnectedDevice),
            7 => Ok(Self::SetTopBox),
            other => Err(other),
        }
    }
}

#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum ConnectionType {
    Unknown = 0,
    Ethernet = 1,
    Wifi = 2,
    CellularUnknown = 3,
    Cellular2G = 4,
    Cellular3G = 5,
    Cellular4G = 6,
    Cellular5G = 7,
}

impl TryFrom<i64> for ConnectionType {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, i64> {
        match v {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Ethernet),
            2 => Ok(Self::Wifi),
            3 => Ok(Self::CellularUnknown),
            4 => Ok(Self::Cellular2G),
            5 => Ok(Self::Cellular3G),
            6 => Ok(Self::Cellular4G),
            7 => Ok(Self::Cellular5G),
            other => Err(other),
        }
    }
}

#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum AdPosition {
    Unknown = 0,
    AboveTheFold = 1,
    Locked = 2,
    BelowTheFold = 3,
    Header = 4,
    Footer = 5,
    Sidebar = 6,
    FullScreen = 7,
}

impl TryFrom<i64> for AdPosition {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, i64> {
        match v {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::AboveTheFold),
            2 => Ok(Self::Locked),
            3 => Ok(Self::BelowTheFold),
            4 => Ok(Self::Header),
            5 => Ok(Self::Footer),
            6 => Ok(Self::Sidebar),
            7 => Ok(Self::FullScreen),
            other => Err(other),
        }
    }
}

/// Top-level OpenRTB 2.6 bid request. `id` and `imp` default on decode so a
/// request missing them still deserializes; their absence is reported by the
/// schema pass, not by serde.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub imp: Vec<Imp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmax: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cur: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badv: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bseat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wseat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wlang: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allimps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regs: Option<Regs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Imp {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<Native>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmp: Option<Pmp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloorcur: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

impl Imp {
    /// Tag of the ad-format union: which of banner/video/audio/native this
    /// impression offers. First match wins when several are present.
    pub fn media_type(&self) -> Option<MediaType> {
        if self.banner.is_some() {
            Some(MediaType::Banner)
        } else if self.video.is_some() {
            Some(MediaType::Video)
        } else if self.audio.is_some() {
            Some(MediaType::Audio)
        } else if self.native.is_some() {
            Some(MediaType::Native)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Banner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<Format>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btype: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battr: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topframe: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expdir: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<i64>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Format {
    #[serde(default)]
    pub w: i64,
    #[serde(default)]
    pub h: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wratio: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hratio: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wmin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmin: Option<i64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Video {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startdelay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipmin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipafter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playbackmethod: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companionad: Option<Vec<Banner>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battr: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Audio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startdelay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battr: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Native {
    // In practice this can be a JSON object or a string; use Value for flexibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battr: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Site {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct App {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storeurl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contentrating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub livestream: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lmt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devicetype: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectiontype: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pxratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Geo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyeruid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yob: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Regs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coppa: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub us_privacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fd: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pchain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Pmp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_auction: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deals: Option<Vec<Deal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloorcur: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wseat: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wadomain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_request() {
        let v = serde_json::json!({
            "id": "r1",
            "imp": [{"id":"1","banner":{"w":300,"h":250}}],
            "at": 2
        });
        let req: BidRequest = serde_json::from_value(v).unwrap();
        assert_eq!(req.id, "r1");
        assert_eq!(req.imp.len(), 1);
        assert_eq!(req.at, Some(2));
        assert_eq!(req.imp[0].media_type(), Some(MediaType::Banner));
    }

    #[test]
    fn missing_required_fields_still_decode() {
        let v = serde_json::json!({"tmax": 120});
        let req: BidRequest = serde_json::from_value(v).unwrap();
        assert!(req.id.is_empty());
        assert!(req.imp.is_empty());
        assert_eq!(req.tmax, Some(120));
    }

    #[test]
    fn media_type_tags_each_format() {
        let video: Imp =
            serde_json::from_value(serde_json::json!({"id":"1","video":{"mimes":["video/mp4"]}}))
                .unwrap();
        assert_eq!(video.media_type(), Some(MediaType::Video));

        let bare: Imp = serde_json::from_value(serde_json::json!({"id":"1"})).unwrap();
        assert_eq!(bare.media_type(), None);
    }

    #[test]
    fn auction_type_codes() {
        assert!(AuctionType::is_known_code(1));
        assert!(AuctionType::is_known_code(2));
        assert!(AuctionType::is_known_code(3));
        assert!(AuctionType::is_known_code(500));
        assert!(!AuctionType::is_known_code(0));
        assert!(!AuctionType::is_known_code(4));
        assert!(!AuctionType::is_known_code(-1));
    }

    #[test]
    fn coded_enum_conversions_reject_out_of_range() {
        assert_eq!(DeviceType::try_from(3), Ok(DeviceType::ConnectedTv));
        assert_eq!(DeviceType::try_from(99), Err(99));
        assert_eq!(ConnectionType::try_from(0), Ok(ConnectionType::Unknown));
        assert_eq!(ConnectionType::try_from(8), Err(8));
        assert_eq!(AdPosition::try_from(7), Ok(AdPosition::FullScreen));
        assert_eq!(AdPosition::try_from(8), Err(8));
    }

    #[test]
    fn site_ref_round_trips_under_protocol_name() {
        let v = serde_json::json!({"domain":"news.example","ref":"https://prev.example"});
        let site: Site = serde_json::from_value(v).unwrap();
        assert_eq!(site.referrer.as_deref(), Some("https://prev.example"));
        let back = serde_json::to_value(&site).unwrap();
        assert_eq!(back["ref"], "https://prev.example");
    }
}
