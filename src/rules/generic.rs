use super::{PatternRule, Relief, Severity, Trigger};
use crate::features::Signal;

/// Language-neutral fallbacks, written as pseudocode.
pub static RULES: &[PatternRule] = &[
    PatternRule {
        id: "quadratic-iteration",
        title: "Nested loops make this code quadratic in the input size",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 2.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for each a in items:\n    for each b in items:\n        if a == b: keep a",
        after: "seen = hash set of items\nfor each a in items:\n    if a in seen: keep a",
        explanation: "Each extra nesting level multiplies the work by the input size. Replace the inner scan with a hashed lookup.",
    },
    PatternRule {
        id: "cubic-iteration",
        title: "Three or more nested loops",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 3.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for i: for j: for k: work(i, j, k)",
        after: "precompute what depends on (i, k) once, then loop over j",
        explanation: "Cubic loops dominate runtime for any real input.",
    },
    PatternRule {
        id: "string-concat-in-loop",
        title: "String concatenation inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::StringConcatInLoopCount, 0.0),
        relief: Relief::zero(Signal::StringConcatInLoopCount),
        before: "s = \"\"\nfor each part in parts:\n    s = s + part",
        after: "s = join(parts)",
        explanation: "Immutable strings are copied on each concatenation. Collect the parts and join once.",
    },
    PatternRule {
        id: "alloc-in-loop",
        title: "Allocation inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::AllocInLoopCount, 0.0),
        relief: Relief::zero(Signal::AllocInLoopCount),
        before: "for each x in data:\n    buf = new Buffer()\n    use(buf, x)",
        after: "buf = new Buffer()\nfor each x in data:\n    buf.reset()\n    use(buf, x)",
        explanation: "Allocating per iteration costs allocator and collector time. Reuse what can be reused.",
    },
    PatternRule {
        id: "io-in-loop",
        title: "I/O inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::IoInLoopCount, 0.0),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for each row in rows:\n    write(row)",
        after: "write(all rows at once)",
        explanation: "I/O calls carry fixed overhead. Batch them.",
    },
    PatternRule {
        id: "await-in-loop",
        title: "Sequential waits inside a loop",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::AwaitInLoopCount, 0.0),
        relief: Relief::zero(Signal::AwaitInLoopCount),
        before: "for each job in jobs:\n    await run(job)",
        after: "await all(run(job) for each job in jobs)",
        explanation: "Independent waits can overlap instead of queueing behind each other.",
    },
    PatternRule {
        id: "recursive-call",
        title: "Recursion",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::RecursionCount, 0.0),
        relief: Relief::zero(Signal::RecursionCount),
        before: "f(n) = f(n - 1) + f(n - 2)",
        after: "iterate from the base case up, or cache f(n)",
        explanation: "Recursion without caching can repeat the same work many times.",
    },
    PatternRule {
        id: "high-complexity",
        title: "High cyclomatic complexity",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::CyclomaticComplexity, 10.0),
        relief: Relief::halve(Signal::BranchCount),
        before: "if a: ... elif b: ... elif c: ... (many branches)",
        after: "table = {a: handle_a, b: handle_b, c: handle_c}\ntable[key]()",
        explanation: "Many branches hurt prediction and make hot paths harder to optimise. A lookup table or smaller functions help.",
    },
];

/// Score below which the whole result gets a `low-green-score` finding.
pub const LOW_SCORE_THRESHOLD: f64 = 40.0;

/// Rules judged on the green score rather than on individual signals.
pub static SCORE_RULES: &[PatternRule] = &[PatternRule {
    id: "low-green-score",
    title: "Low green score",
    severity: Severity::High,
    trigger: Trigger::ScoreBelow(LOW_SCORE_THRESHOLD),
    relief: Relief::halve(Signal::NestedLoopDepth),
    before: "the current implementation",
    after: "rework the algorithm: flatten nested loops, batch I/O, build results once",
    explanation: "Several inefficiencies add up here. Start with the highest-ranked suggestions; most of the cost sits in the loop structure.",
}];
