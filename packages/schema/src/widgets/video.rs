//! Video widget (YouTube, Vimeo or self-hosted)

use super::advanced_group;
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};

pub const TYPE_ID: &str = "video";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Video",
        "media",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Video",
                vec![
                    ControlSpec::select(
                        "video_type",
                        "Source",
                        "youtube",
                        &[("youtube", "YouTube"), ("vimeo", "Vimeo"), ("hosted", "Self Hosted")],
                    ),
                    ControlSpec::url("youtube_url", "Link", "https://www.youtube.com/watch?v=XHOmBV4js_E")
                        .when("video_type", "youtube"),
                    ControlSpec::url("vimeo_url", "Link", "https://vimeo.com/235215203").when("video_type", "vimeo"),
                    ControlSpec::url("hosted_url", "File URL", "").when("video_type", "hosted"),
                    ControlSpec::switcher("autoplay", "Autoplay", false),
                    ControlSpec::switcher("mute", "Mute", false),
                    ControlSpec::switcher("loop", "Loop", false),
                    ControlSpec::switcher("controls", "Player Controls", true),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Video",
                vec![ControlSpec::select(
                    "aspect_ratio",
                    "Aspect Ratio",
                    "169",
                    &[("169", "16:9"), ("43", "4:3"), ("32", "3:2"), ("11", "1:1")],
                )],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-video")
}

fn render(settings: &Settings) -> String {
    let ratio = settings.text_of("aspect_ratio").unwrap_or("169");
    let player = match settings.text_of("video_type").unwrap_or("youtube") {
        "hosted" => hosted_player(settings),
        "vimeo" => settings
            .text_of("vimeo_url")
            .and_then(vimeo_embed_url)
            .map(|url| iframe(&with_params(url, settings))),
        _ => settings
            .text_of("youtube_url")
            .and_then(youtube_embed_url)
            .map(|url| iframe(&with_params(url, settings))),
    };

    Tag::new("div")
        .class("pc-video")
        .class(format!("pc-aspect-ratio-{}", ratio))
        .html(&player.unwrap_or_default())
        .build()
}

fn hosted_player(settings: &Settings) -> Option<String> {
    let src = settings.text_of("hosted_url")?;
    let video = Tag::new("video")
        .class("pc-video-player")
        .attr("src", src)
        .attr_if(settings.bool_of("autoplay"), "autoplay", "")
        .attr_if(settings.bool_of("mute"), "muted", "")
        .attr_if(settings.bool_of("loop"), "loop", "")
        .attr_if(settings.bool_of("controls"), "controls", "");
    Some(video.build())
}

fn iframe(src: &str) -> String {
    Tag::new("iframe")
        .class("pc-video-iframe")
        .attr("src", src)
        .attr("frameborder", "0")
        .attr("allowfullscreen", "")
        .build()
}

fn with_params(mut url: String, settings: &Settings) -> String {
    let params: Vec<String> = [
        ("autoplay", settings.bool_of("autoplay")),
        ("mute", settings.bool_of("mute")),
        ("loop", settings.bool_of("loop")),
        ("controls", settings.bool_of("controls")),
    ]
    .iter()
    .map(|(name, on)| format!("{}={}", name, u8::from(*on)))
    .collect();
    url.push('?');
    url.push_str(&params.join("&"));
    url
}

/// `watch?v=ID`, `youtu.be/ID` and `embed/ID` forms
pub fn youtube_embed_url(url: &str) -> Option<String> {
    let id = youtube_id(url)?;
    (!id.is_empty()).then(|| format!("https://www.youtube.com/embed/{}", id))
}

fn youtube_id(url: &str) -> Option<&str> {
    if let Some((_, rest)) = url.split_once("v=") {
        return rest.split('&').next();
    }
    let (_, rest) = url
        .split_once("youtu.be/")
        .or_else(|| url.split_once("/embed/"))?;
    rest.split(['?', '/']).next()
}

pub fn vimeo_embed_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("vimeo.com/")?;
    let id = rest
        .split(['?', '/'])
        .find(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))?;
    Some(format!("https://player.vimeo.com/video/{}", id))
}
