//! Lazy construct discovery for the globally tracked kinds.
//!
//! Kinds are discovered in stages, in a fixed order: comments hide
//! everything, tags hide the bodies of opaque extension tags, and only then
//! can the bracket pass (templates, parser functions, parameters and
//! wikilinks together), external links and tables run. Each stage keeps the
//! ranges edited since it last ran. [`ensure`] widens them to whole lines and
//! to every construct they touch, rescans just those regions, and reconciles
//! the result with the span table so unchanged constructs keep their
//! identity. A region whose scan depends on the text around it (an unclosed
//! comment, an unmatched tag or table, brackets left open) sends the stage
//! back to a whole-document scan.
//!
//! The bracket stage also remembers what its last pass left unresolved:
//! openers still on the stack and pairs that did not become constructs.
//! Either can change how the text around them pairs up, so an edit touching
//! an unresolved opener rescans the whole document.

use std::collections::HashSet;
use std::ops::Range;

use log::{debug, trace};
use wikispan_syntax::{
    ConstructKind, Fill, Found, Layers, Purpose, brackets, comment, ext_link, shadow, tables,
    tag,
};

use crate::adjust::{Edit, map_dirty, merge_ranges};
use crate::document::Document;
use crate::span::SpanId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stage {
    Comments,
    Tags,
    Brackets,
    ExternalLinks,
    Tables,
}

impl Stage {
    const ORDER: [Stage; 5] = [
        Stage::Comments,
        Stage::Tags,
        Stage::Brackets,
        Stage::ExternalLinks,
        Stage::Tables,
    ];

    fn of(kind: ConstructKind) -> Option<Stage> {
        match kind {
            ConstructKind::Comment => Some(Stage::Comments),
            ConstructKind::Tag => Some(Stage::Tags),
            ConstructKind::Template
            | ConstructKind::ParserFunction
            | ConstructKind::Parameter
            | ConstructKind::WikiLink => Some(Stage::Brackets),
            ConstructKind::ExternalLink => Some(Stage::ExternalLinks),
            ConstructKind::Table => Some(Stage::Tables),
            ConstructKind::Argument
            | ConstructKind::TableCell
            | ConstructKind::Section
            | ConstructKind::List => None,
        }
    }

    fn kinds(self) -> &'static [ConstructKind] {
        match self {
            Stage::Comments => &[ConstructKind::Comment],
            Stage::Tags => &[ConstructKind::Tag],
            Stage::Brackets => &[
                ConstructKind::Template,
                ConstructKind::ParserFunction,
                ConstructKind::Parameter,
                ConstructKind::WikiLink,
            ],
            Stage::ExternalLinks => &[ConstructKind::ExternalLink],
            Stage::Tables => &[ConstructKind::Table],
        }
    }

    /// Kinds a rescanned region must hold whole: the stage's own kinds and
    /// the layers its shadow masks.
    fn context(self) -> &'static [ConstructKind] {
        match self {
            Stage::Comments => &[ConstructKind::Comment],
            Stage::Tags => &[ConstructKind::Tag, ConstructKind::Comment],
            Stage::Brackets => &[
                ConstructKind::Template,
                ConstructKind::ParserFunction,
                ConstructKind::Parameter,
                ConstructKind::WikiLink,
                ConstructKind::Comment,
                ConstructKind::Tag,
            ],
            Stage::ExternalLinks => &[
                ConstructKind::ExternalLink,
                ConstructKind::Comment,
                ConstructKind::Tag,
            ],
            Stage::Tables => &[
                ConstructKind::Table,
                ConstructKind::Comment,
                ConstructKind::Tag,
            ],
        }
    }

    fn dependencies(self) -> &'static [Stage] {
        match self {
            Stage::Comments => &[],
            Stage::Tags => &[Stage::Comments],
            _ => &[Stage::Comments, Stage::Tags],
        }
    }

    /// Stages whose results change what later stages may see.
    fn hides_text(self) -> bool {
        matches!(self, Stage::Comments | Stage::Tags)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct StageState {
    scanned: bool,
    dirty: Vec<Range<usize>>,
}

/// What the last bracket pass could not resolve, in current offsets.
#[derive(Debug, Default)]
struct Unresolved {
    /// Bracket pairs that are not constructs.
    pairs: Vec<Range<usize>>,
    /// Opening runs nothing closed.
    openers: Vec<Range<usize>>,
}

impl Unresolved {
    fn map(&mut self, edit: &Edit) {
        for range in self.pairs.iter_mut().chain(self.openers.iter_mut()) {
            *range = map_dirty(range.clone(), edit);
        }
    }

    /// Replace what was recorded inside `region` with a fresh scan of it.
    fn replace(&mut self, region: &Range<usize>, fresh: Unresolved) {
        let outside = |r: &Range<usize>| r.start < region.start || region.end < r.end;
        self.pairs.retain(outside);
        self.openers.retain(outside);
        self.pairs.extend(fresh.pairs);
        self.openers.extend(fresh.openers);
    }
}

/// Per-stage record of what needs rescanning.
#[derive(Debug, Default)]
pub(crate) struct Discovery {
    stages: [StageState; 5],
    unresolved: Unresolved,
}

impl Discovery {
    /// Carry the dirty ranges through an edit and add the inserted text.
    pub(crate) fn record_edit(&mut self, edit: &Edit) {
        for state in self.stages.iter_mut().filter(|s| s.scanned) {
            for range in &mut state.dirty {
                *range = map_dirty(range.clone(), edit);
            }
            state.dirty.push(edit.inserted_range());
        }
        self.unresolved.map(edit);
    }

    pub(crate) fn mark_all_dirty(&mut self, range: Range<usize>) {
        for state in self.stages.iter_mut().filter(|s| s.scanned) {
            state.dirty.push(range.clone());
        }
    }

    fn mark_dirty(&mut self, stage: Stage, ranges: &[Range<usize>]) {
        let state = &mut self.stages[stage.index()];
        if state.scanned {
            state.dirty.extend(ranges.iter().cloned());
        }
    }

    /// The ranges to rescan for `stage`, or `None` if it is up to date.
    fn take_pending(&mut self, stage: Stage, len: usize) -> Option<Vec<Range<usize>>> {
        let state = &mut self.stages[stage.index()];
        if !state.scanned {
            state.scanned = true;
            state.dirty.clear();
            return Some(vec![0..len]);
        }
        if state.dirty.is_empty() {
            return None;
        }
        Some(merge_ranges(std::mem::take(&mut state.dirty)))
    }

    #[cfg(test)]
    pub(crate) fn is_clean(&self) -> bool {
        self.stages.iter().all(|s| s.scanned && s.dirty.is_empty())
    }
}

/// Bring the spans of a globally discovered kind up to date.
/// Owner-scoped kinds are left to their views.
pub(crate) fn ensure(doc: &mut Document, kind: ConstructKind) {
    if let Some(stage) = Stage::of(kind) {
        ensure_stage(doc, stage);
    }
}

fn ensure_stage(doc: &mut Document, stage: Stage) {
    for dependency in stage.dependencies() {
        ensure_stage(doc, *dependency);
    }
    let Some(pending) = doc.discovery.take_pending(stage, doc.len()) else {
        return;
    };

    let scans = scope(doc, stage, pending)
        .and_then(|regions| scan_regions(doc, stage, regions))
        .unwrap_or_else(|| {
            let whole = 0..doc.len();
            trace!("discovering {stage:?} in the whole document");
            let scan = scan_region(doc, stage, &whole);
            vec![(whole, scan)]
        });

    let mut changed = Vec::new();
    for (region, scan) in scans {
        if stage == Stage::Brackets {
            doc.discovery.unresolved.replace(&region, scan.unresolved);
        }
        changed.extend(reconcile(doc, stage.kinds(), &region, scan.found));
    }

    if stage.hides_text() && !changed.is_empty() {
        for later in Stage::ORDER.iter().skip(stage.index() + 1) {
            doc.discovery.mark_dirty(*later, &changed);
        }
    }
}

/// Widen the dirty ranges of a stage into regions that can be rescanned on
/// their own, or `None` when the whole document has to be rescanned.
fn scope(doc: &mut Document, stage: Stage, pending: Vec<Range<usize>>) -> Option<Vec<Range<usize>>> {
    let whole = 0..doc.len();
    let mut regions = Vec::with_capacity(pending.len());
    for dirty in pending {
        if dirty == whole {
            return None;
        }
        let region = expand(doc, stage, dirty);
        if region == whole {
            return None;
        }
        if stage == Stage::Brackets
            && let Some(opener) = doc
                .discovery
                .unresolved
                .openers
                .iter()
                .find(|opener| touches(opener, &region))
        {
            debug!("edit near the unmatched opener at {opener:?}, rescanning all brackets");
            return None;
        }
        regions.push(region);
    }
    Some(merge_ranges(regions))
}

fn touches(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Grow `region` to whole lines and to every registered construct of the
/// stage's context (and, for brackets, every unresolved pair) it touches,
/// until nothing changes.
fn expand(doc: &mut Document, stage: Stage, mut region: Range<usize>) -> Range<usize> {
    loop {
        let mut grown = doc.buffer.line_start(region.start)..doc.buffer.line_end(region.end);
        for kind in stage.context() {
            for span in doc.spans.touching(*kind, &grown) {
                grown = grown.start.min(span.start)..grown.end.max(span.end);
            }
        }
        if stage == Stage::Brackets {
            for pair in &doc.discovery.unresolved.pairs {
                if touches(pair, &grown) {
                    grown = grown.start.min(pair.start)..grown.end.max(pair.end);
                }
            }
        }
        if grown == region {
            return region;
        }
        region = grown;
    }
}

/// The result of scanning one region, in document offsets.
struct RegionScan {
    found: Vec<Found>,
    unresolved: Unresolved,
    /// Whether the region scans the same inside the whole document.
    self_contained: bool,
}

impl RegionScan {
    fn new(found: Vec<Found>, self_contained: bool) -> Self {
        Self {
            found,
            unresolved: Unresolved::default(),
            self_contained,
        }
    }
}

/// Scan every region, or give up with `None` as soon as one of them depends
/// on the text around it.
fn scan_regions(
    doc: &mut Document,
    stage: Stage,
    regions: Vec<Range<usize>>,
) -> Option<Vec<(Range<usize>, RegionScan)>> {
    let mut scans = Vec::with_capacity(regions.len());
    for region in regions {
        trace!("discovering {stage:?} in {region:?}");
        let scan = scan_region(doc, stage, &region);
        if !scan.self_contained {
            debug!("{stage:?} in {region:?} reach outside it, rescanning the whole document");
            return None;
        }
        scans.push((region, scan));
    }
    Some(scans)
}

fn scan_region(doc: &mut Document, stage: Stage, region: &Range<usize>) -> RegionScan {
    let text = doc.buffer.slice(region.clone()).into_owned();
    let local = match stage {
        Stage::Comments => text,
        Stage::Tags => region_layers(doc, region, false).shadow(&text, Purpose::Tags),
        Stage::Brackets => region_layers(doc, region, true).shadow(&text, Purpose::Brackets),
        Stage::ExternalLinks => {
            region_layers(doc, region, true).shadow(&text, Purpose::ExternalLinks)
        }
        Stage::Tables => region_layers(doc, region, true).shadow(&text, Purpose::Tables),
    };
    let at = |range: Range<usize>| region.start + range.start..region.start + range.end;
    let each = |kind: ConstructKind, ranges: Vec<Range<usize>>| -> Vec<Found> {
        ranges.into_iter().map(|r| Found::new(kind, at(r))).collect()
    };

    match stage {
        Stage::Comments => {
            let found = comment::scan(&local);
            let closed = found
                .last()
                .is_none_or(|last| comment::is_closed(&local[last.clone()]));
            RegionScan::new(each(ConstructKind::Comment, found), closed)
        }
        Stage::Tags => {
            let found = tag::scan(&local, &doc.opaque)
                .into_iter()
                .map(|t| t.range)
                .collect();
            let contained = tag::is_self_contained(&local, &doc.opaque);
            RegionScan::new(each(ConstructKind::Tag, found), contained)
        }
        Stage::Brackets => {
            let scan = brackets::scan_all(&local);
            let contained = scan.is_self_contained();
            RegionScan {
                found: scan
                    .found
                    .into_iter()
                    .map(|f| Found::new(f.kind, at(f.range)))
                    .collect(),
                unresolved: Unresolved {
                    pairs: scan.unclassified.into_iter().map(at).collect(),
                    openers: scan.unmatched.into_iter().map(at).collect(),
                },
                self_contained: contained,
            }
        }
        Stage::ExternalLinks => {
            RegionScan::new(each(ConstructKind::ExternalLink, ext_link::scan(&local)), true)
        }
        Stage::Tables => {
            let contained = tables::is_self_contained(&local);
            RegionScan::new(each(ConstructKind::Table, tables::scan(&local)), contained)
        }
    }
}

/// The comments (and optionally tags) registered inside `region`, as layers
/// over the region's own text.
fn region_layers(doc: &mut Document, region: &Range<usize>, with_tags: bool) -> Layers {
    let local = |range: Range<usize>| range.start - region.start..range.end - region.start;
    let mut layers = Layers {
        comments: doc
            .spans
            .ids_within(ConstructKind::Comment, region)
            .into_iter()
            .filter_map(|id| doc.spans.range(id))
            .map(local)
            .collect(),
        ..Layers::default()
    };
    if !with_tags {
        return layers;
    }
    for id in doc.spans.ids_within(ConstructKind::Tag, region) {
        let Some(range) = doc.spans.range(id) else {
            continue;
        };
        let own = doc.buffer.slice(range.clone()).into_owned();
        let masks: Vec<(Range<usize>, Fill)> = comment::scan(&own)
            .into_iter()
            .map(|r| (r, Fill::Blank))
            .collect();
        if let Some(parts) = tag::parse(&shadow(&own, &masks)) {
            layers
                .tags
                .push(parts.to_match(&own, range.start - region.start, &doc.opaque));
        }
    }
    layers
}

/// Register what a scan of `region` found and detach the spans of `kinds`
/// inside `region` it no longer finds. Returns the ranges that changed.
fn reconcile(
    doc: &mut Document,
    kinds: &[ConstructKind],
    region: &Range<usize>,
    found: Vec<Found>,
) -> Vec<Range<usize>> {
    let mut kept = HashSet::new();
    let mut changed = Vec::new();
    for f in found {
        match doc.spans.lookup(f.kind, &f.range) {
            Some(id) => {
                kept.insert(id);
            }
            None => {
                kept.insert(doc.spans.register(f.kind, f.range.clone()));
                changed.push(f.range);
            }
        }
    }
    for kind in kinds {
        for id in doc.spans.ids_within(*kind, region) {
            if kept.contains(&id) {
                continue;
            }
            let Some(range) = doc.spans.range(id) else {
                continue;
            };
            if doc.spans.detach(id) {
                debug!("{kind} at {range:?} no longer parses");
                changed.push(range);
            }
        }
    }
    changed
}

/// What an owner-scoped scan of `region` produced.
pub(crate) struct ScopedScan<'a> {
    pub(crate) kind: ConstructKind,
    pub(crate) region: Range<usize>,
    /// Ranges to register and hand out views for.
    pub(crate) found: &'a [Range<usize>],
    /// Other ranges the scan still considers valid (not registered here).
    pub(crate) valid: &'a [Range<usize>],
    /// Nested owners that scan their own contents.
    pub(crate) foreign: &'a [Range<usize>],
}

/// Register the spans an owner-scoped scan found and detach the spans of its
/// kind in its region it no longer finds, except those inside foreign ranges.
pub(crate) fn reconcile_scoped(doc: &mut Document, scan: &ScopedScan<'_>) -> Vec<SpanId> {
    let ids: Vec<SpanId> = scan
        .found
        .iter()
        .map(|range| doc.spans.register(scan.kind, range.clone()))
        .collect();
    let mut stale = 0;
    for id in doc.spans.ids_within(scan.kind, &scan.region) {
        let Some(range) = doc.spans.range(id) else {
            continue;
        };
        let still_valid = scan.found.contains(&range) || scan.valid.contains(&range);
        let nested = scan
            .foreign
            .iter()
            .any(|f| f.start <= range.start && range.end <= f.end);
        if !still_valid && !nested && doc.spans.detach(id) {
            stale += 1;
        }
    }
    if stale > 0 {
        debug!(
            "{} of {:?}: {stale} stale spans detached",
            scan.kind, scan.region
        );
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParseOptions;
    use pretty_assertions::assert_eq;

    /// The regions the next discovery of `stage` would rescan, without
    /// running it. `None` means the whole document.
    fn next_regions(doc: &mut Document, stage: Stage) -> Option<Vec<Range<usize>>> {
        for dependency in stage.dependencies() {
            ensure_stage(doc, *dependency);
        }
        let pending = doc.discovery.stages[stage.index()].dirty.clone();
        scope(doc, stage, merge_ranges(pending))
    }

    fn texts(doc: &mut Document, kind: ConstructKind) -> Vec<String> {
        ensure(doc, kind);
        doc.spans
            .ids(kind)
            .into_iter()
            .map(|id| doc.text_of(id))
            .collect()
    }

    #[test]
    fn comments_hide_brackets() {
        let mut doc = Document::new("{{a}}<!-- {{b}} -->", None, &ParseOptions::default());
        assert_eq!(texts(&mut doc, ConstructKind::Template), vec!["{{a}}"]);
        assert!(doc.discovery.stages[Stage::Comments.index()].scanned);
    }

    #[test]
    fn second_discovery_is_a_no_op() {
        let mut doc = Document::new("{{a|{{b}}}}", None, &ParseOptions::default());
        ensure(&mut doc, ConstructKind::Template);
        let first = doc.spans.ids(ConstructKind::Template);
        doc.ensure_all();
        assert!(doc.discovery.is_clean());
        assert_eq!(doc.spans.ids(ConstructKind::Template), first);
    }

    #[test]
    fn edits_rescan_only_what_is_needed() {
        let mut doc = Document::new("{{a}}\n{{b}}\n", None, &ParseOptions::default());
        ensure(&mut doc, ConstructKind::Template);
        let ids = doc.spans.ids(ConstructKind::Template);
        let root = doc.spans.root();
        doc.splice(root, 12..12, "{{c}}").unwrap();
        assert_eq!(
            texts(&mut doc, ConstructKind::Template),
            vec!["{{a}}", "{{b}}", "{{c}}"]
        );
        assert_eq!(doc.spans.ids(ConstructKind::Template)[..2], ids[..]);
    }

    #[test]
    fn opening_a_comment_hides_later_constructs() {
        let mut doc = Document::new("a {{b}}\n{{c}}", None, &ParseOptions::default());
        assert_eq!(texts(&mut doc, ConstructKind::Template).len(), 2);
        let root = doc.spans.root();
        doc.splice(root, 1..1, "<!--").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Template), Vec::<String>::new());
        assert_eq!(texts(&mut doc, ConstructKind::Comment).len(), 1);
    }

    #[test]
    fn closing_brackets_far_away_rescan_the_document() {
        let mut doc = Document::new("{{a\n\nb", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Template).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 6..6, "}}").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Template), vec!["{{a\n\nb}}"]);
    }

    #[test]
    fn joined_brackets_form_a_new_link() {
        let mut doc = Document::new("x [[a] ] y", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::WikiLink).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 6..7, "").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::WikiLink), vec!["[[a]]"]);
    }

    #[test]
    fn deleting_a_blocking_opener_finds_the_outer_template() {
        let mut doc = Document::new("{{a\n[[\n}}", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Template).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 4..6, "").unwrap();
        assert_eq!(next_regions(&mut doc, Stage::Brackets), None);
        assert_eq!(texts(&mut doc, ConstructKind::Template), vec!["{{a\n\n}}"]);
    }

    #[test]
    fn closing_a_blocking_opener_finds_both_constructs() {
        let mut doc = Document::new("{{a|[[b}}\nx", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Template).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 7..7, "]]").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Template), vec!["{{a|[[b]]}}"]);
        assert_eq!(texts(&mut doc, ConstructKind::WikiLink), vec!["[[b]]"]);
    }

    #[test]
    fn commenting_out_a_blocker_finds_the_outer_template() {
        let mut doc = Document::new("{{a\n[[\n}}", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Template).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 4..4, "<!--").unwrap();
        doc.splice(root, 10..10, "-->").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Comment), vec!["<!--[[-->"]);
        assert_eq!(
            texts(&mut doc, ConstructKind::Template),
            vec!["{{a\n<!--[[-->\n}}"]
        );
    }

    #[test]
    fn unresolved_pairs_widen_the_bracket_region() {
        let mut doc = Document::new("x\n[[http://a\nb]]\ny", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::WikiLink).is_empty());
        assert_eq!(doc.discovery.unresolved.pairs, vec![2..16]);
        let root = doc.spans.root();
        doc.splice(root, 13..13, "c").unwrap();
        assert_eq!(next_regions(&mut doc, Stage::Brackets), Some(vec![2..17]));
        assert!(texts(&mut doc, ConstructKind::WikiLink).is_empty());
    }

    #[test]
    fn table_edits_stay_on_their_lines() {
        let mut doc = Document::new("{|\n|a\n|}\nx\n{|\n|b\n|}", None, &ParseOptions::default());
        let before = {
            ensure(&mut doc, ConstructKind::Table);
            doc.spans.ids(ConstructKind::Table)
        };
        let root = doc.spans.root();
        doc.splice(root, 10..10, "yy").unwrap();
        assert_eq!(next_regions(&mut doc, Stage::Tables), Some(vec![9..12]));
        assert_eq!(
            texts(&mut doc, ConstructKind::Table),
            vec!["{|\n|a\n|}", "{|\n|b\n|}"]
        );
        assert_eq!(doc.spans.ids(ConstructKind::Table), before);

        doc.splice(root, 4..4, "z").unwrap();
        assert_eq!(next_regions(&mut doc, Stage::Tables), Some(vec![0..9]));
        assert_eq!(texts(&mut doc, ConstructKind::Table)[0], "{|\n|za\n|}");
    }

    #[test]
    fn opening_a_table_far_from_its_end_rescans_the_document() {
        let mut doc = Document::new("a\n|x\n|}", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Table).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 0..1, "{|").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Table), vec!["{|\n|x\n|}"]);
    }

    #[test]
    fn comment_and_tag_edits_stay_on_their_lines() {
        let mut doc = Document::new(
            "a <!-- b -->\nc\n<b>d</b>\ne",
            None,
            &ParseOptions::default(),
        );
        assert_eq!(texts(&mut doc, ConstructKind::Comment), vec!["<!-- b -->"]);
        assert_eq!(texts(&mut doc, ConstructKind::Tag), vec!["<b>d</b>"]);
        let root = doc.spans.root();
        doc.splice(root, 14..14, "cc").unwrap();
        assert_eq!(next_regions(&mut doc, Stage::Comments), Some(vec![13..16]));
        assert_eq!(next_regions(&mut doc, Stage::Tags), Some(vec![13..16]));

        doc.splice(root, 27..27, " <i>f</i>").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Tag), vec!["<b>d</b>", "<i>f</i>"]);
        assert_eq!(texts(&mut doc, ConstructKind::Comment), vec!["<!-- b -->"]);
    }

    #[test]
    fn an_unclosed_tag_rescans_the_document() {
        let mut doc = Document::new("x\ny\n</span>", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Tag).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 0..1, "<span>").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Tag), vec!["<span>\ny\n</span>"]);
    }

    #[test]
    fn closing_a_comment_uncovers_later_constructs() {
        let mut doc = Document::new("<!-- a\n{{b}}", None, &ParseOptions::default());
        assert!(texts(&mut doc, ConstructKind::Template).is_empty());
        let root = doc.spans.root();
        doc.splice(root, 6..6, " -->").unwrap();
        assert_eq!(texts(&mut doc, ConstructKind::Comment), vec!["<!-- a -->"]);
        assert_eq!(texts(&mut doc, ConstructKind::Template), vec!["{{b}}"]);
    }
}
