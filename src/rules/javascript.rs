use super::{PatternRule, Relief, Severity, Trigger};
use crate::features::{FeatureVector, Signal};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SYNC_FS: Regex = Regex::new(r"\bfs\.\w+Sync\s*\(").unwrap();
}

fn sync_fs_call(_features: &FeatureVector, code: &str) -> bool {
    SYNC_FS.is_match(code)
}

pub static RULES: &[PatternRule] = &[
    PatternRule {
        id: "quadratic-iteration",
        title: "Nested loops make this code quadratic in the input size",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 2.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (const a of items) {\n  for (const b of items) {\n    if (a === b) matches.push(a);\n  }\n}",
        after: "const seen = new Set(items);\nconst matches = items.filter((a) => seen.has(a));",
        explanation: "Each extra nesting level multiplies the work by the input size. A Set or Map lookup replaces the inner scan.",
    },
    PatternRule {
        id: "cubic-iteration",
        title: "Three or more nested loops",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 3.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (let i = 0; i < n; i++)\n  for (let j = 0; j < n; j++)\n    for (let k = 0; k < n; k++)\n      c[i][j] += a[i][k] * b[k][j];",
        after: "// precompute an index or use a typed-array library for the inner product",
        explanation: "Cubic loops dominate runtime for any real input. Index the data so the innermost scan disappears.",
    },
    PatternRule {
        id: "await-in-loop",
        title: "await inside a loop serialises independent requests",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::AwaitInLoopCount, 0.0),
        relief: Relief::zero(Signal::AwaitInLoopCount),
        before: "for (const url of urls) {\n  const res = await fetch(url);\n  results.push(await res.json());\n}",
        after: "const results = await Promise.all(\n  urls.map(async (url) => (await fetch(url)).json())\n);",
        explanation: "Each iteration waits for the previous round trip. Promise.all issues the requests together.",
    },
    PatternRule {
        id: "string-concat-in-loop",
        title: "String built with += inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::StringConcatInLoopCount, 0.0),
        relief: Relief::zero(Signal::StringConcatInLoopCount),
        before: "let html = \"\";\nfor (const item of items) {\n  html += \"<li>\" + item + \"</li>\";\n}",
        after: "const html = items.map((item) => `<li>${item}</li>`).join(\"\");",
        explanation: "Repeated concatenation creates intermediate strings. Building the parts and joining once avoids them.",
    },
    PatternRule {
        id: "alloc-in-loop",
        title: "Objects or arrays allocated on every iteration",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::AllocInLoopCount, 0.0),
        relief: Relief::zero(Signal::AllocInLoopCount),
        before: "for (const p of points) {\n  const v = new Vector(p.x, p.y);\n  total = total.add(v);\n}",
        after: "const v = new Vector(0, 0);\nfor (const p of points) {\n  v.set(p.x, p.y);\n  total.addInPlace(v);\n}",
        explanation: "Short-lived allocations keep the garbage collector busy. Reuse one object when its identity does not matter.",
    },
    PatternRule {
        id: "io-in-loop",
        title: "Console or network I/O inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::IoInLoopCount, 0.0),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for (const row of rows) {\n  console.log(row);\n}",
        after: "console.log(rows.join(\"\\n\"));",
        explanation: "Every call crosses into the runtime's I/O layer. Batch the output into one call.",
    },
    PatternRule {
        id: "sync-fs-call",
        title: "Blocking fs.*Sync call",
        severity: Severity::Medium,
        trigger: Trigger::Custom(sync_fs_call),
        relief: Relief::zero(Signal::IoCallCount),
        before: "const data = fs.readFileSync(path, \"utf8\");",
        after: "const data = await fs.promises.readFile(path, \"utf8\");",
        explanation: "Synchronous file calls block the event loop while the disk works. The promise API lets other work proceed.",
    },
    PatternRule {
        id: "append-in-loop",
        title: "Array built by pushing in a loop",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::AppendInLoopCount, 0.0),
        relief: Relief::zero(Signal::AppendInLoopCount),
        before: "const out = [];\nfor (const x of data) {\n  out.push(x * 2);\n}",
        after: "const out = data.map((x) => x * 2);",
        explanation: "map knows the final length up front and allocates the array once.",
    },
    PatternRule {
        id: "index-based-iteration",
        title: "Counter loop over an array's indices",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::IndexIterationCount, 0.0),
        relief: Relief::zero(Signal::IndexIterationCount),
        before: "for (let i = 0; i < items.length; i++) {\n  process(items[i]);\n}",
        after: "for (const item of items) {\n  process(item);\n}",
        explanation: "for...of avoids the repeated index lookups and bounds checks.",
    },
    PatternRule {
        id: "invariant-call-in-loop",
        title: "Loop condition recomputes a value that does not change",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::InvariantCallInLoopCount, 0.0),
        relief: Relief::zero(Signal::InvariantCallInLoopCount),
        before: "for (let i = 0; i < Object.keys(obj).length; i++) { /* ... */ }",
        after: "const keys = Object.keys(obj);\nfor (let i = 0; i < keys.length; i++) { /* ... */ }",
        explanation: "The condition runs once per iteration. Hoist the computation above the loop.",
    },
];
