//! Runtime shim locations and bundled fallbacks
//!
//! The shims emulate the source API surface inside converted packages. Their
//! real builds are fetched with the `fetch-shims` command; the bundled
//! bodies here are minimal stand-ins so a freshly converted package loads.

use crate::models::NewFile;
use std::path::PathBuf;

pub const SHIM_DIR: &str = "oex_shim";
/// Background-process shim, injected into the background page.
pub const BACKGROUND_SHIM: &str = "oex_shim/operaextensions_background.min.js";
/// Shim for every other page (popup, options, arbitrary HTML).
pub const ANYPAGE_SHIM: &str = "oex_shim/operaextensions_popup.min.js";
/// Injected-script shim; sorts first inside includes/ so it loads before
/// every user script.
pub const INJECTED_SCRIPT_SHIM: &str = "includes/000.operaextensions_injectedscript.min.js";
pub const RESOURCE_LOADER_HTML: &str = "oex_shim/popup_resourceloader.html";
pub const RESOURCE_LOADER_JS: &str = "oex_shim/popup_resourceloader.js";

/// Where `fetch-shims` downloads the real shim builds from.
pub const SHIM_FETCH_BASE: &str = "https://addons.opera.com/tools/oex_shim/build/";

/// Names of the shim scripts to fetch, relative to `SHIM_FETCH_BASE`.
pub const FETCHED_SHIMS: [&str; 3] = [
    "operaextensions_background.min.js",
    "operaextensions_popup.min.js",
    "operaextensions_injectedscript.min.js",
];

const FALLBACK_SHIM: &str = "\
/* Minimal stand-in for the runtime shim. Replace with a real build via\n\
   the fetch-shims command. */\n\
var opera = window.opera || {};\n\
opera.isReady = opera.isReady || function (callback) { callback(); };\n";

const RESOURCE_LOADER_HTML_BODY: &str = r#"<!DOCTYPE html>
<style>body { margin: 0; padding: 0; min-width: 300px; min-height:
 200px; }</style>
<iframe seamless width="100%" height="100%" style="display: block;
 position: absolute;"></iframe>
<script src="/oex_shim/popup_resourceloader.js"></script>"#;

const RESOURCE_LOADER_JS_BODY: &str = r#"function getParam( key ) {
   key = key.replace(/[\[]/, "\\\[").replace(/[\]]/, "\\\]");
   var regexS = "[\\?&]" + key + "=([^&#]*)";
   var regex = new RegExp(regexS);
   var results = regex.exec(window.location.search);
   return results == null ? "" :
 window.decodeURIComponent(results[1].replace(/\+/g, " "));
 }

 var s = getParam('href'), w = getParam('w'), h = getParam('h');
 if(s !== "") { document.querySelector('iframe').src = window.atob(s); }
 if(w !== "") { document.body.style.minWidth = w.replace(/\D/g,'') + "px"; }
 if(h !== "") { document.body.style.minHeight = h.replace(/\D/g,'') + "px"; }
"#;

/// Wrap a rewritten script so it runs once the shim reports readiness.
pub fn wrap_in_is_ready(script: &str) -> String {
    format!("opera.isReady(function(){{\n{}\n}});\n", script)
}

fn shim_file(path: &str, purpose: &str) -> NewFile {
    NewFile {
        path: PathBuf::from(path),
        content: FALLBACK_SHIM.to_string(),
        purpose: purpose.to_string(),
    }
}

pub fn background_shim_file() -> NewFile {
    shim_file(BACKGROUND_SHIM, "background page runtime shim")
}

pub fn anypage_shim_file() -> NewFile {
    shim_file(ANYPAGE_SHIM, "popup/options page runtime shim")
}

pub fn injected_script_shim_file() -> NewFile {
    shim_file(INJECTED_SCRIPT_SHIM, "injected script runtime shim")
}

pub fn resource_loader_files() -> Vec<NewFile> {
    vec![
        NewFile {
            path: PathBuf::from(RESOURCE_LOADER_HTML),
            content: RESOURCE_LOADER_HTML_BODY.to_string(),
            purpose: "popup resource loader page".to_string(),
        },
        NewFile {
            path: PathBuf::from(RESOURCE_LOADER_JS),
            content: RESOURCE_LOADER_JS_BODY.to_string(),
            purpose: "popup resource loader script".to_string(),
        },
    ]
}
