//! Path-to-label rule tables
//!
//! Each table is an ordered list of regular expressions. The first rule whose
//! pattern matches a path decides that path's labels; a rule with no labels
//! marks a path as recognised without labelling it.

use once_cell::sync::Lazy;
use regex::Regex;

/// How a rule produces one label name
#[derive(Debug, Clone, Copy)]
pub enum LabelSpec {
    /// A fixed label name
    Literal(&'static str),
    /// The text captured by the given group of the rule's pattern
    Group(usize),
}

use LabelSpec::{Group, Literal};

/// A single pattern and the labels it yields
#[derive(Debug)]
pub struct Rule {
    pattern: Regex,
    labels: Vec<LabelSpec>,
}

impl Rule {
    fn new(pattern: &str, labels: &[LabelSpec]) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("invalid label rule pattern"),
            labels: labels.to_vec(),
        }
    }

    /// Labels for `path`, or `None` when the pattern does not match
    pub fn apply(&self, path: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(path)?;

        let labels = self
            .labels
            .iter()
            .filter_map(|spec| match spec {
                Literal(name) => Some((*name).to_string()),
                Group(index) => captures.get(*index).map(|m| m.as_str().to_string()),
            })
            .filter(|label| !label.is_empty())
            .collect();

        Some(labels)
    }
}

/// Ordered rule list, first match wins
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Labels from the first matching rule, `None` if nothing matches
    pub fn labels_for(&self, path: &str) -> Option<Vec<String>> {
        self.rules.iter().find_map(|rule| rule.apply(path))
    }

    /// Whether any rule recognises `path`
    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.pattern.is_match(path))
    }
}

/// Label used when a change spans too many JS subsystems
pub const LIB_SRC_LABEL: &str = "lib / src";

/// Labels naming a JS module under `lib/`
pub const JS_SUBSYSTEMS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "crypto",
    "debugger",
    "dgram",
    "dns",
    "domain",
    "events",
    "esm",
    "fs",
    "http",
    "https",
    "http2",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "report",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker",
    "zlib",
];

pub fn is_js_subsystem(label: &str) -> bool {
    JS_SUBSYSTEMS.contains(&label)
}

/// Rules that only apply when every changed file matches one of them
pub static EXCLUSIVE_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(vec![
        Rule::new(r"^test/addons/", &[Literal("test"), Literal("addons")]),
        // subsystem-specific API doc changes
        Rule::new(r"^doc/api/(\w+)\.md$", &[Literal("doc"), Group(1)]),
        Rule::new(r"^test/", &[Literal("test")]),
        Rule::new(r"^doc/", &[Literal("doc")]),
        Rule::new(r"^benchmark/", &[Literal("benchmark")]),
    ])
});

/// Rules mapping source paths to subsystem labels
pub static SUBSYSTEM_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(vec![
        // special cases first
        Rule::new(r"^\.travis\.yml$", &[Literal("build"), Literal("test")]),
        // a version bump is not a C++ change
        Rule::new(r"^src/node_version\.h$", &[]),
        Rule::new(r"^src/(?:node_)?crypto", &[Literal("c++"), Literal("crypto")]),
        Rule::new(r"^src/node_file", &[Literal("c++"), Literal("fs")]),
        Rule::new(r"^src/node_http_parser", &[Literal("c++"), Literal("http_parser")]),
        Rule::new(r"^src/(?:node_)?url", &[Literal("c++"), Literal("url-whatwg")]),
        Rule::new(r"^src/node_api", &[Literal("c++"), Literal("n-api")]),
        Rule::new(r"^src/inspector_", &[Literal("c++"), Literal("inspector")]),
        Rule::new(r"^src/tracing", &[Literal("c++"), Literal("tracing")]),
        Rule::new(r"^src/(?:async-wrap|async_wrap)", &[Literal("c++"), Literal("async_wrap")]),
        Rule::new(r"^src/(?:tcp|udp|pipe|tty)_wrap", &[Literal("c++"), Literal("net")]),
        Rule::new(r"^src/stream_", &[Literal("c++"), Literal("stream")]),
        // python files under src/ are not C++
        Rule::new(r"^src/.+\.py$", &[Literal(LIB_SRC_LABEL)]),
        Rule::new(r"^src/", &[Literal("c++")]),
        // policy and meta-info files
        Rule::new(
            r"^([A-Z]+$|CODE_OF_CONDUCT|ROADMAP|WORKING_GROUPS|GOVERNANCE|CHANGELOG|CONTRIBUTING|\.github|CODEOWNERS)",
            &[Literal("meta")],
        ),
        // other top-level markdown files are documentation
        Rule::new(r"^\w+\.md$", &[Literal("doc")]),
        // makefiles and build scripts
        Rule::new(
            r"^(tools/)?(Makefile|BSDmakefile|create_android_makefiles)$",
            &[Literal("build")],
        ),
        Rule::new(
            r"^tools/(install\.py|genv8constants\.py|getnodeversion\.py|js2c\.py|utils\.py|configure\.d/.*)$",
            &[Literal("build")],
        ),
        Rule::new(r"^(configure|node\.gyp|common\.gypi|vcbuild\.bat)$", &[Literal("build")]),
        Rule::new(r"^tools/", &[Literal("tools")]),
        Rule::new(r"^\.(eslint|remark|editorconfig)", &[Literal("tools")]),
        // dependencies; libuv and V8 don't follow the directory name
        Rule::new(r"^deps/uv/", &[Literal("libuv")]),
        Rule::new(
            r"^deps/v8/tools/gen-postmortem-metadata\.py",
            &[Literal("v8 engine"), Literal("post-mortem")],
        ),
        Rule::new(r"^deps/v8/", &[Literal("v8 engine")]),
        Rule::new(r"^deps/([^/]+)", &[Group(1)]),
        // lib/ oddities
        Rule::new(r"^lib/(punycode|\w+/freelist|sys\.js)", &[]),
        Rule::new(r"^lib/constants\.js$", &[Literal(LIB_SRC_LABEL)]),
        Rule::new(r"^lib/internal/process/?.*$", &[Literal("process")]),
        Rule::new(r"^lib/internal/(?:v8_prof_polyfill|v8_prof_processor)", &[Literal("tools")]),
        Rule::new(r"^lib/internal/(?:streams/.*|(?:.*_)?stream.*?)$", &[Literal("stream")]),
        Rule::new(r"^lib/internal/url\.js$", &[Literal("url-whatwg")]),
        Rule::new(r"^lib/internal/modules/esm", &[Literal("esm")]),
        // remaining lib/ files map to their module name, e.g. _(stream)_wrap.js
        Rule::new(r"^lib/_(\w+?)_\w+\.js$", &[Group(1)]),
        Rule::new(r"^lib(/internal)?/(\w+)\.js$", &[Group(2)]),
        Rule::new(r"^lib/internal/(\w+)(?:/|$)", &[Group(1)]),
    ])
});

/// Matches release branches (`v6.x`, `v8.2`, `v10.x-staging`)
pub static VERSION_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(v\d+\.(?:\d+|x))(?:-staging)?$").expect("invalid version pattern"));
