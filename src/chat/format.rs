//! Chat line formatting.
//!
//! Inbound PRIVMSGs are rendered as an HTML `<span>` for the display. How
//! much decoration a line gets depends on which tags the server attached:
//!
//! | tags present                                   | decoration     |
//! |------------------------------------------------|----------------|
//! | display-name, subscriber, turbo, user-type     | [`Decoration::Full`] |
//! | display-name, subscriber, turbo                | [`Decoration::NoUserType`] |
//! | display-name                                   | [`Decoration::NameOnly`] |
//! | none of the above                              | [`Decoration::SenderOnly`] |
//!
//! A missing `color` tag is filled in from a [`ColorPicker`] before the
//! decoration is chosen. Tags with an empty value count as absent.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use chatrelay_proto::Message;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The server's default name colors, used when a user never picked one.
pub const DEFAULT_PALETTE: [&str; 15] = [
    "#FF0000", "#0000FF", "#00FF00", "#B22222", "#FF7F50", "#9ACD32", "#FF4500", "#2E8B57",
    "#DAA520", "#D2691E", "#5F9EA0", "#1E90FF", "#FF69B4", "#8A2BE2", "#00FF7F",
];

/// Chooses a name color for messages without a `color` tag.
pub trait ColorPicker: Send + Sync {
    fn pick(&self) -> String;
}

/// Picks uniformly from [`DEFAULT_PALETTE`] with a time-seeded RNG.
pub struct PaletteColorPicker {
    rng: Mutex<StdRng>,
}

impl PaletteColorPicker {
    pub fn time_seeded() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ColorPicker for PaletteColorPicker {
    fn pick(&self) -> String {
        let index = self.rng.lock().gen_range(0..DEFAULT_PALETTE.len());
        DEFAULT_PALETTE[index].to_string()
    }
}

/// Always returns the same color.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedColor(pub String);

#[cfg(test)]
impl ColorPicker for FixedColor {
    fn pick(&self) -> String {
        self.0.clone()
    }
}

/// The display-relevant tags of one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSet<'a> {
    pub user_type: Option<&'a str>,
    pub subscriber: Option<&'a str>,
    pub turbo: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub color: Option<&'a str>,
}

impl<'a> TagSet<'a> {
    pub fn from_message(msg: &'a Message) -> Self {
        let get = |key: &str| msg.tag_value(key).filter(|v| !v.is_empty());
        Self {
            user_type: get("user-type"),
            subscriber: get("subscriber"),
            turbo: get("turbo"),
            display_name: get("display-name"),
            color: get("color"),
        }
    }
}

/// How much of the tag set ends up in the rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Full,
    NoUserType,
    /// Display name only; subscriber and turbo default to `0`.
    NameOnly,
    /// Raw sender nickname, no data attributes.
    SenderOnly,
}

impl Decoration {
    pub fn select(tags: &TagSet<'_>) -> Self {
        match (tags.display_name, tags.subscriber, tags.turbo, tags.user_type) {
            (Some(_), Some(_), Some(_), Some(_)) => Self::Full,
            (Some(_), Some(_), Some(_), None) => Self::NoUserType,
            (Some(_), _, _, _) => Self::NameOnly,
            _ => Self::SenderOnly,
        }
    }
}

/// Renders chat lines for the display.
pub struct Formatter {
    picker: Box<dyn ColorPicker>,
}

impl Formatter {
    pub fn new(picker: impl ColorPicker + 'static) -> Self {
        Self {
            picker: Box::new(picker),
        }
    }

    /// Formatter backed by a time-seeded [`PaletteColorPicker`].
    pub fn with_palette() -> Self {
        Self::new(PaletteColorPicker::time_seeded())
    }

    /// Render an inbound PRIVMSG.
    pub fn format(&self, msg: &Message) -> String {
        let sender = msg.source_nickname().unwrap_or_default();
        let text = msg.trailing.as_deref().unwrap_or_default();
        self.format_parts(sender, TagSet::from_message(msg), text)
    }

    pub fn format_parts(&self, sender: &str, tags: TagSet<'_>, text: &str) -> String {
        let picked;
        let color = match tags.color {
            Some(color) => color,
            None => {
                picked = self.picker.pick();
                picked.as_str()
            }
        };
        render(Decoration::select(&tags), sender, &tags, color, text)
    }
}

/// Render a line typed by the local user; it never passes through the
/// server so there are no tags to decorate with.
pub fn format_local(username: &str, color: &str, text: &str) -> String {
    render(
        Decoration::SenderOnly,
        username,
        &TagSet::default(),
        color,
        text,
    )
}

fn render(
    decoration: Decoration,
    sender: &str,
    tags: &TagSet<'_>,
    color: &str,
    text: &str,
) -> String {
    let mut out = String::with_capacity(96 + text.len());
    out.push_str(r#"<span class="chat-line""#);

    let name = match decoration {
        Decoration::Full | Decoration::NoUserType | Decoration::NameOnly => {
            if decoration == Decoration::Full {
                push_attr(&mut out, "data-user-type", tags.user_type.unwrap_or_default());
            }
            let (subscriber, turbo) = match decoration {
                Decoration::NameOnly => ("0", "0"),
                _ => (
                    tags.subscriber.unwrap_or("0"),
                    tags.turbo.unwrap_or("0"),
                ),
            };
            push_attr(&mut out, "data-subscriber", subscriber);
            push_attr(&mut out, "data-turbo", turbo);
            tags.display_name.unwrap_or(sender)
        }
        Decoration::SenderOnly => sender,
    };

    out.push_str(r#" style="color:"#);
    push_escaped(&mut out, color);
    out.push_str(r#""><b>"#);
    push_escaped(&mut out, name);
    out.push_str("</b>: ");
    push_escaped(&mut out, text);
    out.push_str("</span>");
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, r#" {name}=""#);
    push_escaped(out, value);
    out.push('"');
}

/// Append `s` with HTML special characters replaced by entities.
pub fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
