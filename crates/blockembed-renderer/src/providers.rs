//! Provider share-URL → embed markup rewriting.
//!
//! Users usually paste a share link (`https://youtu.be/...`) rather than the
//! provider's iframe snippet. For providers with a known embed endpoint the
//! link is rewritten into an `<iframe>`; anything that doesn't parse as one of
//! their URLs is left alone.

use std::borrow::Cow;

use blockembed_common::Provider;
use pulldown_cmark_escape::escape_href;
use url::Url;

/// Whether share URLs for this provider are rewritten into embed markup.
pub fn supports_url_rewrite(provider: Provider) -> bool {
    match provider {
        Provider::Youtube | Provider::Vimeo | Provider::GoogleMaps | Provider::Miro => true,
        Provider::Soundcloud | Provider::Figma => false,
    }
}

/// Text already carries frame markup and must be posted as-is.
pub fn is_frame_markup(text: &str) -> bool {
    text.contains("<iframe")
}

/// Rewrite `text` into provider embed markup when it is a recognisable share URL.
///
/// Returns the input unchanged for providers without rewriting, for existing
/// frame markup, and for anything that doesn't parse as a provider URL.
pub fn rewrite_embed(provider: Provider, text: &str) -> Cow<'_, str> {
    if !supports_url_rewrite(provider) || is_frame_markup(text) {
        return Cow::Borrowed(text);
    }

    match embed_src(provider, text) {
        Some(src) => Cow::Owned(embed_html(provider, &src)),
        None => {
            tracing::debug!(
                target: "blockembed::providers",
                provider = provider.as_str(),
                "not a provider URL, posting as-is"
            );
            Cow::Borrowed(text)
        }
    }
}

/// Parse a pasted share URL, tolerating a missing scheme.
pub fn parse_share_url(text: &str) -> Option<Url> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{trimmed}")))
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Embed endpoint for a provider share URL.
pub fn embed_src(provider: Provider, text: &str) -> Option<Url> {
    let url = parse_share_url(text)?;
    let host = url.host_str()?.trim_start_matches("www.").to_ascii_lowercase();

    match provider {
        Provider::Youtube => youtube_src(&url, &host),
        Provider::Vimeo => vimeo_src(&url, &host),
        Provider::GoogleMaps => google_maps_src(&url, &host),
        Provider::Miro => miro_src(&url, &host),
        Provider::Soundcloud | Provider::Figma => None,
    }
}

fn youtube_src(url: &Url, host: &str) -> Option<Url> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let id = match host {
        "youtu.be" => segments.next()?.to_string(),
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => query_value(url, "v")?,
            "embed" | "shorts" | "live" => segments.next()?.to_string(),
            _ => return None,
        },
        _ => return None,
    };

    if !is_plain_id(&id) {
        return None;
    }

    let mut src = Url::parse("https://www.youtube.com/embed/").ok()?.join(&id).ok()?;
    if let Some(start) = query_value(url, "t").and_then(|t| parse_seconds(&t)) {
        src.query_pairs_mut().append_pair("start", &start.to_string());
    }
    Some(src)
}

fn vimeo_src(url: &Url, host: &str) -> Option<Url> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let id = match host {
        "vimeo.com" => segments.find(|s| s.chars().all(|c| c.is_ascii_digit()))?,
        "player.vimeo.com" => match segments.next()? {
            "video" => segments.next()?,
            _ => return None,
        },
        _ => return None,
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Url::parse("https://player.vimeo.com/video/").ok()?.join(id).ok()
}

fn google_maps_src(url: &Url, host: &str) -> Option<Url> {
    let is_google = host.starts_with("google.") || host.starts_with("maps.google.");
    if !is_google {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if !host.starts_with("maps.") && segments.first() != Some(&"maps") {
        return None;
    }

    let mut query = query_value(url, "q");
    let mut zoom = None;

    // `/maps/place/<name>/@lat,lng,15z`
    if let Some(at) = segments.iter().find(|s| s.starts_with('@')) {
        let mut parts = at.trim_start_matches('@').split(',');
        if let (Some(lat), Some(lng)) = (parts.next(), parts.next()) {
            if lat.parse::<f64>().is_ok() && lng.parse::<f64>().is_ok() {
                query = Some(format!("{lat},{lng}"));
                zoom = parts
                    .next()
                    .map(|z| z.trim_end_matches('z'))
                    .and_then(|z| z.parse::<f64>().ok())
                    .map(|z| z.round() as u32);
            }
        }
    }

    if query.is_none() {
        if let Some(pos) = segments.iter().position(|s| *s == "place") {
            query = segments
                .get(pos + 1)
                .map(|name| name.replace('+', " "));
        }
    }

    let query = query?;
    let mut src = Url::parse("https://www.google.com/maps").ok()?;
    {
        let mut pairs = src.query_pairs_mut();
        pairs.append_pair("q", &query);
        if let Some(zoom) = zoom {
            pairs.append_pair("z", &zoom.to_string());
        }
        pairs.append_pair("output", "embed");
    }
    Some(src)
}

fn miro_src(url: &Url, host: &str) -> Option<Url> {
    if host != "miro.com" {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["app", "board" | "live-embed", id, ..] if !id.is_empty() => {
            Url::parse(&format!("https://miro.com/app/live-embed/{id}/")).ok()
        }
        _ => None,
    }
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `90`, `90s`, `1m30s` → seconds. Overflow yields `None`.
fn parse_seconds(raw: &str) -> Option<u64> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let mut total = 0u64;
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }
    digits.is_empty().then_some(total)
}

fn frame_height(provider: Provider) -> u32 {
    match provider {
        Provider::GoogleMaps => 450,
        Provider::Miro => 432,
        _ => 360,
    }
}

/// Frame markup for an embed endpoint.
pub fn embed_html(provider: Provider, src: &Url) -> String {
    let mut escaped = String::new();
    // Writing to String can't fail
    let _ = escape_href(&mut escaped, src.as_str());
    let allow = match provider {
        Provider::Youtube | Provider::Vimeo => {
            r#" allow="autoplay; encrypted-media; picture-in-picture" allowfullscreen"#
        }
        _ => "",
    };
    format!(
        r#"<iframe src="{escaped}" width="100%" height="{}" frameborder="0"{allow}></iframe>"#,
        frame_height(provider)
    )
}
