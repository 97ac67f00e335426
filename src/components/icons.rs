use dioxus::prelude::*;

/// Inline stroke icons, 24x24 viewbox. Unknown names render a plain circle.
#[component]
pub fn Icon(name: String, class: String) -> Element {
    match name.as_str() {
        "search" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                circle { cx: "11", cy: "11", r: "8" }
                path { d: "M21 21l-4.35-4.35" }
            }
        },
        "playlist" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                path { d: "M3 6h12" }
                path { d: "M3 12h12" }
                path { d: "M3 18h8" }
                path { d: "M17 18V8l4-1" }
                circle { cx: "15", cy: "18", r: "2" }
            }
        },
        "music" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                path { d: "M9 18V5l12-2v13" }
                circle { cx: "6", cy: "18", r: "3" }
                circle { cx: "18", cy: "16", r: "3" }
            }
        },
        "play" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "currentColor",
                polygon { points: "5 3 19 12 5 21 5 3" }
            }
        },
        "pause" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "currentColor",
                rect { x: "6", y: "4", width: "4", height: "16" }
                rect { x: "14", y: "4", width: "4", height: "16" }
            }
        },
        "prev" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "currentColor",
                polygon { points: "19 20 9 12 19 4 19 20" }
                line { x1: "5", y1: "19", x2: "5", y2: "5", stroke: "currentColor", stroke_width: "2" }
            }
        },
        "next" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "currentColor",
                polygon { points: "5 4 15 12 5 20 5 4" }
                line { x1: "19", y1: "5", x2: "19", y2: "19", stroke: "currentColor", stroke_width: "2" }
            }
        },
        "plus" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                line { x1: "12", y1: "5", x2: "12", y2: "19" }
                line { x1: "5", y1: "12", x2: "19", y2: "12" }
            }
        },
        "user-plus" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                path { d: "M16 21v-2a4 4 0 0 0-4-4H5a4 4 0 0 0-4 4v2" }
                circle { cx: "8.5", cy: "7", r: "4" }
                line { x1: "20", y1: "8", x2: "20", y2: "14" }
                line { x1: "23", y1: "11", x2: "17", y2: "11" }
            }
        },
        "users" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                path { d: "M17 21v-2a4 4 0 0 0-4-4H5a4 4 0 0 0-4 4v2" }
                circle { cx: "9", cy: "7", r: "4" }
                path { d: "M23 21v-2a4 4 0 0 0-3-3.87" }
                path { d: "M16 3.13a4 4 0 0 1 0 7.75" }
            }
        },
        "logout" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                path { d: "M9 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h4" }
                polyline { points: "16 17 21 12 16 7" }
                line { x1: "21", y1: "12", x2: "9", y2: "12" }
            }
        },
        "arrow-left" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                line { x1: "19", y1: "12", x2: "5", y2: "12" }
                polyline { points: "12 19 5 12 12 5" }
            }
        },
        "check" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                polyline { points: "20 6 9 17 4 12" }
            }
        },
        "alert" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                circle { cx: "12", cy: "12", r: "10" }
                line { x1: "12", y1: "8", x2: "12", y2: "12" }
                line { x1: "12", y1: "16", x2: "12.01", y2: "16" }
            }
        },
        "x" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                line { x1: "18", y1: "6", x2: "6", y2: "18" }
                line { x1: "6", y1: "6", x2: "18", y2: "18" }
            }
        },
        "loader" => rsx! {
            svg { class: "{class} animate-spin", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                circle { cx: "12", cy: "12", r: "10", opacity: "0.25" }
                path { d: "M12 2a10 10 0 0 1 10 10", opacity: "0.75" }
            }
        },
        "clock" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                circle { cx: "12", cy: "12", r: "10" }
                polyline { points: "12 6 12 12 16 14" }
            }
        },
        "trash" => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                polyline { points: "3 6 5 6 21 6" }
                path { d: "M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6m3 0V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2" }
            }
        },
        _ => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24", fill: "none", stroke: "currentColor", stroke_width: "2",
                circle { cx: "12", cy: "12", r: "10" }
            }
        },
    }
}
