use kanjidic_reader::kanjidic::codes::{CodeTable, SimpleCode, SpecialCode};
use kanjidic_reader::kanjidic::format::line::classify_token;
use kanjidic_reader::{
    keys, parse_line, CodeRegistry, Fields, FormatOptions, Kanji, Kanjidic, KanjidicError,
    LoadOptions, ReadingMode, Value,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const SAMPLE: &str = "kanjidic_sample.utf8";
const EXTRA: &str = "kanjidic_extra.utf8";
const SAMPLE_EUC: &str = "kanjidic_sample.euc";

/// Data lines in each fixture, in file order.
const SAMPLE_CHARACTERS: &[&str] = &["亜", "亞", "畑"];
const EXTRA_CHARACTERS: &[&str] = &["甲", "乙"];

fn fixture_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    p
}

fn utf8() -> LoadOptions {
    LoadOptions::default().with_encoding(encoding_rs::UTF_8)
}

fn open_sample() -> Kanjidic {
    let mut dic = Kanjidic::new();
    dic.open_with(fixture_path(SAMPLE), &utf8())
        .unwrap_or_else(|e| panic!("failed to open {}: {}", SAMPLE, e));
    dic
}

fn parse(line: &str) -> Kanji {
    parse_line(CodeRegistry::shared(), line, "")
        .expect("parse ok")
        .unwrap_or_else(|| panic!("not a data line: {:?}", line))
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| text(s)).collect())
}

fn map(pairs: &[(&str, Value)]) -> Value {
    Value::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Fields>(),
    )
}

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

#[test]
fn first_two_tokens_are_character_and_prefixed_jis_code() {
    let kanji = parse_line(CodeRegistry::shared(), "亜 3021 U4e9c S7", "J")
        .unwrap()
        .unwrap();
    assert_eq!(kanji.character(), "亜");
    assert_eq!(kanji.jis_code(), "J3021");
    assert_eq!(kanji.dictionaries(), Some(&Fields::new()));
}

#[test]
fn reading_mode_switch_routes_later_readings() {
    let kanji = parse("漢 0 {to think} T1 かん F123 S13");
    assert_eq!(kanji.character(), "漢");
    assert_eq!(kanji.jis_code(), "0");
    assert_eq!(kanji.get(keys::MEANINGS), Some(&text("to think")));
    assert_eq!(kanji.get(keys::NAME_READING), Some(&text("かん")));
    assert_eq!(kanji.get(keys::READING), None);
    assert_eq!(kanji.get("frequency"), Some(&text("123")));
    assert_eq!(kanji.get(keys::STROKES), Some(&text("13")));
}

#[test]
fn reading_mode_is_returned_by_each_step() {
    let registry = CodeRegistry::standard();
    let (partial, mode) = classify_token(&registry, "T1", ReadingMode::Reading).unwrap();
    assert!(partial.is_empty());
    assert_eq!(mode, ReadingMode::NameReading);

    let (_, mode) = classify_token(&registry, "T2", mode).unwrap();
    assert_eq!(mode, ReadingMode::RadicalName);

    let (_, mode) = classify_token(&registry, "T7", mode).unwrap();
    assert_eq!(mode, ReadingMode::RadicalName, "T with another value is a no-op");
}

#[test]
fn reading_mode_switch_reads_leading_digits() {
    let registry = CodeRegistry::standard();
    let (_, mode) = classify_token(&registry, "T1x", ReadingMode::Reading).unwrap();
    assert_eq!(mode, ReadingMode::NameReading);

    let (_, mode) = classify_token(&registry, "T02", ReadingMode::Reading).unwrap();
    assert_eq!(mode, ReadingMode::RadicalName);

    let (_, mode) = classify_token(&registry, "T0001", ReadingMode::Reading).unwrap();
    assert_eq!(mode, ReadingMode::NameReading);

    let (_, mode) = classify_token(&registry, "Tx1", ReadingMode::RadicalName).unwrap();
    assert_eq!(mode, ReadingMode::RadicalName, "no leading digits is a no-op");

    let kanji = parse("乙 3235 オツ T1x お");
    assert_eq!(kanji.get(keys::NAME_READING), Some(&text("お")));
}

#[test]
fn radical_names_and_unchanged_mode() {
    let kanji = parse("乙 3235 オツ T5 イツ T2 おつにょう");
    assert_eq!(kanji.get(keys::READING), Some(&list(&["オツ", "イツ"])));
    assert_eq!(kanji.get(keys::RADICAL_NAME), Some(&text("おつにょう")));
}

#[test]
fn repeated_keys_keep_line_order() {
    let kanji = parse("亜 3021 {a} {b} {c}");
    assert_eq!(kanji.get(keys::MEANINGS), Some(&list(&["a", "b", "c"])));
}

#[test]
fn comment_lines_are_skipped() {
    let registry = CodeRegistry::standard();
    for line in [
        "# KANJIDIC header",
        "KANJIDIC plain text header",
        "",
        "   indented",
        "123 456",
    ] {
        let parsed = parse_line(&registry, line, "").expect("no error for comment lines");
        assert!(parsed.is_none(), "{:?} should be skipped", line);
    }
}

#[test]
fn unmatched_tokens_land_in_undefined() {
    let kanji = parse("亜 3021 abc S7 xyz");
    assert_eq!(kanji.get(keys::UNDEFINED), Some(&list(&["abc", "xyz"])));
    assert_eq!(kanji.get(keys::STROKES), Some(&text("7")));

    let (partial, mode) = classify_token(CodeRegistry::shared(), "", ReadingMode::Reading).unwrap();
    assert_eq!(partial.get(keys::UNDEFINED), Some(&text("")));
    assert_eq!(mode, ReadingMode::Reading);
}

#[test]
fn dictionary_codes_merge_under_dictionaries() {
    let kanji = parse("亜 3021 N43 DR3273 I0a7.14 IN1616 MN272 MP1.0525 DR9");
    assert_eq!(kanji.dictionary("nelson_c"), Some(&text("43")));
    assert_eq!(kanji.dictionary("deroo"), Some(&list(&["3273", "9"])));
    assert_eq!(kanji.dictionary("sh_desc"), Some(&text("0a7.14")));
    assert_eq!(kanji.dictionary("sh_kk"), Some(&text("1616")));
    assert_eq!(
        kanji.dictionary("moro"),
        Some(&map(&[("number", text("272")), ("page", text("1.0525"))]))
    );
}

#[test]
fn subcode_is_kept_with_simple_values() {
    let kanji = parse("亜 3021 HAB12");
    assert_eq!(kanji.dictionary("halpern_njecd"), Some(&text("AB12")));
}

#[test]
fn morohashi_with_unknown_subcode_is_undefined() {
    let kanji = parse("亜 3021 MX12");
    assert_eq!(
        kanji.dictionary("moro"),
        Some(&map(&[(keys::UNDEFINED, text("12"))]))
    );
}

#[test]
fn crossreference_resolves_through_the_code_table() {
    let kanji = parse("亜 3021 XJ05033 XN42 XDR12 XAA7");
    assert_eq!(
        kanji.get(keys::CROSSREFERENCE),
        Some(&map(&[
            (keys::JIS_CODE, text("05033")),
            (
                keys::DICTIONARIES,
                map(&[("nelson_c", text("42")), ("deroo", text("12"))])
            ),
            (keys::UNDEFINED, text("7")),
        ]))
    );
}

#[test]
fn crossreference_cannot_switch_reading_mode() {
    let kanji = parse("亜 3021 XT1 ア");
    assert_eq!(kanji.get(keys::CROSSREFERENCE), Some(&map(&[])));
    assert_eq!(kanji.get(keys::READING), Some(&text("ア")));
}

#[test]
fn misclassification_by_subcode() {
    let kanji = parse("亜 3021 ZSP1-2-3 ZPP4-5-6 ZBP7-8-9 ZRP1-1-1 ZQ2-2-2 Z3-3-3");
    assert_eq!(
        kanji.get(keys::MISCLASSIFICATION),
        Some(&map(&[
            (keys::STROKES, text("1-2-3")),
            (keys::POSITION, text("4-5-6")),
            (keys::BOTH, text("7-8-9")),
            (keys::DISAGREEMENT, text("1-1-1")),
            (keys::UNDEFINED, list(&["2-2-2", "3-3-3"])),
        ]))
    );
}

#[test]
fn kokuji_mark_sets_the_flag() {
    let kanji = parse("畑 4829 {(kokuji)} {field}");
    assert_eq!(kanji.get(keys::KOKUJI), Some(&Value::Flag(true)));
    assert_eq!(kanji.get(keys::MEANINGS), Some(&list(&["(kokuji)", "field"])));
}

#[test]
fn runtime_codes_are_picked_up_after_catalog_changes() {
    let mut registry = CodeRegistry::standard();
    assert!(parse_line(&registry, "亜 3021 AA12", "").unwrap().unwrap().get("custom").is_none());

    registry.simple_codes_mut().push(SimpleCode {
        code: "AA".to_string(),
        key: "custom".to_string(),
        label: "Custom code".to_string(),
    });
    let kanji = parse_line(&registry, "亜 3021 AA12", "").unwrap().unwrap();
    assert_eq!(kanji.get("custom"), Some(&text("12")));
    assert_eq!(registry.label("custom"), Some("Custom code"));
}

#[test]
fn reload_is_idempotent() {
    let mut registry = CodeRegistry::standard();
    let before = registry.pattern().unwrap().as_str().to_string();
    registry.reload().unwrap();
    registry.reload().unwrap();
    assert_eq!(registry.pattern().unwrap().as_str(), before);
    assert_eq!(registry.codes().len(), CodeRegistry::standard().codes().len());
}

// ---------------------------------------------------------------------------
// Dictionary lifecycle
// ---------------------------------------------------------------------------

#[test]
fn open_loads_every_data_line_in_order() {
    let dic = open_sample();
    let characters: Vec<&str> = dic.iter().unwrap().map(Kanji::character).collect();
    assert_eq!(characters, SAMPLE_CHARACTERS);

    let a = dic.get("亜").unwrap().expect("亜 entry");
    assert_eq!(a.get(keys::READING), Some(&list(&["ア", "つ.ぐ"])));
    assert_eq!(a.get(keys::NAME_READING), Some(&list(&["や", "つぎ", "つぐ"])));
    assert_eq!(
        a.get(keys::MEANINGS),
        Some(&list(&["Asia", "rank next", "come after", "-ous"]))
    );
    assert_eq!(a.get("skip_code"), Some(&text("4-7-1")));
    assert_eq!(a.get("pinyin"), Some(&text("a4")));
}

#[test]
fn opening_twice_is_a_usage_error() {
    let mut dic = open_sample();
    match dic.open_with(fixture_path(SAMPLE), &utf8()) {
        Err(KanjidicError::AlreadyOpen) => {}
        other => panic!("expected AlreadyOpen, got {:?}", other.map(|_| ())),
    }
    assert_eq!(dic.len().unwrap(), SAMPLE_CHARACTERS.len(), "failed open must not touch entries");

    dic.close();
    assert!(!dic.is_open());
    dic.open_with(fixture_path(EXTRA), &utf8()).expect("reopen after close");
    assert_eq!(dic.len().unwrap(), EXTRA_CHARACTERS.len());
}

#[test]
fn expand_appends_only_data_lines() {
    let mut dic = open_sample();
    let before = dic.len().unwrap();
    let added = dic.expand_with(fixture_path(EXTRA), &utf8()).unwrap();
    assert_eq!(added, EXTRA_CHARACTERS.len());
    assert_eq!(dic.len().unwrap(), before + EXTRA_CHARACTERS.len());

    let characters: Vec<&str> = dic.iter().unwrap().map(Kanji::character).collect();
    let expected: Vec<&str> = SAMPLE_CHARACTERS.iter().chain(EXTRA_CHARACTERS).copied().collect();
    assert_eq!(characters, expected);
}

#[test]
fn closed_dictionary_rejects_collection_operations() {
    let mut dic = Kanjidic::new();
    assert!(!dic.is_open());
    assert!(matches!(dic.entries(), Err(KanjidicError::NotOpen)));
    assert!(matches!(dic.len(), Err(KanjidicError::NotOpen)));
    assert!(matches!(dic.find(|_| true), Err(KanjidicError::NotOpen)));
    assert!(matches!(
        dic.expand_with(fixture_path(EXTRA), &utf8()),
        Err(KanjidicError::NotOpen)
    ));
}

#[test]
fn collection_operations_pass_through() {
    let mut dic = open_sample();
    dic.expand_with(fixture_path(EXTRA), &utf8()).unwrap();

    let grade_taught: Vec<&str> = dic
        .filter(|k| k.get("grade").is_some())
        .unwrap()
        .into_iter()
        .map(Kanji::character)
        .collect();
    assert_eq!(grade_taught, ["亜", "畑", "甲", "乙"]);

    let asia: Vec<&str> = dic
        .search(keys::MEANINGS, "Asia")
        .unwrap()
        .into_iter()
        .map(Kanji::character)
        .collect();
    assert_eq!(asia, ["亜", "亞"]);

    let nelson: Vec<&str> = dic
        .search("nelson_c", "42")
        .unwrap()
        .into_iter()
        .map(Kanji::character)
        .collect();
    assert_eq!(nelson, ["亞"]);

    assert!(dic.get("龍").unwrap().is_none());
}

#[test]
fn scheme_prefixes_every_jis_code() {
    let mut dic = Kanjidic::new();
    dic.open_with(fixture_path(EXTRA), &LoadOptions::new("JIS").with_encoding(encoding_rs::UTF_8))
        .unwrap();
    let codes: Vec<&str> = dic.iter().unwrap().map(Kanji::jis_code).collect();
    assert_eq!(codes, ["JIS3943", "JIS3235"]);
}

#[test]
fn euc_jp_is_the_default_encoding() {
    let mut dic = Kanjidic::new();
    dic.open(fixture_path(SAMPLE_EUC), "").expect("open EUC-JP fixture");
    let entries = dic.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], parse("亜 3021 U4e9c S7 ア つ.ぐ {Asia}"));
}

#[test]
fn encoding_label_selects_the_decoder() {
    let options = LoadOptions::default().with_encoding_label("utf-8");
    assert_eq!(options.encoding, encoding_rs::UTF_8);
    let options = LoadOptions::default().with_encoding_label("no-such-encoding");
    assert_eq!(options.encoding, encoding_rs::UTF_8);
    let options = LoadOptions::default().with_encoding_label("EUC-JP");
    assert_eq!(options.encoding, encoding_rs::EUC_JP);
}

#[test]
fn undecodable_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // A lone EUC-JP lead byte at end of input.
    file.write_all(b"\xb0\xa1 3021\n\xa4").unwrap();
    file.flush().unwrap();

    let mut dic = Kanjidic::new();
    match dic.open(file.path(), "") {
        Err(KanjidicError::Decoding { encoding, .. }) => assert_eq!(encoding, "EUC-JP"),
        other => panic!("expected Decoding, got {:?}", other),
    }
    assert!(!dic.is_open());
}

#[test]
fn missing_file_is_an_io_error() {
    let mut dic = Kanjidic::new();
    let missing = fixture_path("does_not_exist.utf8");
    assert!(matches!(dic.open(&missing, ""), Err(KanjidicError::Io(_))));
}

#[test]
fn load_does_not_touch_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.utf8");
    fs::write(&path, "# tiny\n亜 3021 S7\n").unwrap();

    let dic = Kanjidic::new();
    let entries = dic.load(&path, &utf8()).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!dic.is_open());
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[test]
fn summary_puts_ranked_keys_first_and_hides_dictionaries() {
    let dic = open_sample();
    let a = dic.get("亜").unwrap().unwrap();
    let out = dic.format(a, &FormatOptions::summary());

    assert!(
        out.starts_with(
            "Character: 亜\n\
             Reading: ア, つ.ぐ\n\
             Name reading (名乗り): や, つぎ, つぐ\n\
             Meaning: Asia, rank next, come after, -ous\n\
             JIS code: 3021\n\
             Unicode value: 4e9c\n"
        ),
        "unexpected summary:\n{}",
        out
    );
    assert!(!out.contains("Dictionaries"));
    assert!(out.contains("Stroke count: 7\n"));
}

#[test]
fn unranked_keys_follow_entry_order() {
    let kanji = parse("亜 3021 S7 F1509 G8");
    let out = Kanjidic::new().format(&kanji, &FormatOptions::new().hide(keys::DICTIONARIES));
    assert_eq!(
        out,
        "Character: 亜\n\
         JIS code: 3021\n\
         Stroke count: 7\n\
         Frequency in newspapers: 1509\n\
         Grade taught: 8\n"
    );
}

#[test]
fn explicit_ranks_override_character_first() {
    let kanji = parse("亜 3021 S7");
    let options = FormatOptions::new()
        .rank(keys::STROKES, 0)
        .rank(keys::CHARACTER, 1)
        .hide(keys::JIS_CODE)
        .hide(keys::DICTIONARIES);
    let out = Kanjidic::new().format(&kanji, &options);
    assert_eq!(out, "Stroke count: 7\nCharacter: 亜\n");
}

#[test]
fn nested_maps_are_indented_two_spaces_per_level() {
    let kanji = parse("亜 3021 MN272 MP1.0525 H3540");
    let out = Kanjidic::new().format(&kanji, &FormatOptions::new().hide(keys::JIS_CODE));
    assert_eq!(
        out,
        "Character: 亜\n\
         Dictionaries:\n  \
           大漢和辞典:\n    \
             Number: 272\n    \
             Page: 1.0525\n  \
           New Japanese-English Character Dictionary: 3540\n"
    );
}

fn mystery(_: &CodeTable, _subcode: &str, value: &str, _: &mut ReadingMode) -> Fields {
    let mut fields = Fields::new();
    fields.insert("mystery".to_string(), Value::from(value));
    fields
}

#[test]
fn unknown_keys_render_with_their_own_name() {
    let mut registry = CodeRegistry::standard();
    registry.special_codes_mut().push(SpecialCode {
        code: "AB".to_string(),
        handler: mystery,
    });
    let dic = Kanjidic::with_registry(registry);
    let kanji = dic.parse_line("亜 3021 AB1", "").unwrap().unwrap();
    let out = dic.format(&kanji, &FormatOptions::new().hide(keys::JIS_CODE));
    assert_eq!(out, "Character: 亜\nDictionaries:\nmystery: 1\n");
}

#[test]
fn crossreference_is_resolved_while_open() {
    let mut dic = open_sample();
    dic.expand_with(fixture_path(EXTRA), &utf8()).unwrap();

    let kou = dic.get("甲").unwrap().unwrap();
    let out = dic.format(kou, &FormatOptions::summary());
    assert!(
        out.contains("Cross-reference code:\n  JIS code: 3235 (乙)\n"),
        "missing resolution:\n{}",
        out
    );

    let a = dic.get("亜").unwrap().unwrap();
    let out = dic.format(a, &FormatOptions::summary());
    assert!(
        out.contains(
            "Cross-reference code:\n  \
               JIS code: 05033\n  \
               Dictionaries:\n    \
                 Modern Reader's Japanese-English Character Dictionary: 42 (亞)\n"
        ),
        "missing nested resolution:\n{}",
        out
    );
}

#[test]
fn resolution_is_skipped_once_closed() {
    let mut dic = Kanjidic::new();
    dic.open_with(fixture_path(EXTRA), &utf8()).unwrap();
    let kou = dic.get("甲").unwrap().unwrap().clone();
    assert!(dic.format(&kou, &FormatOptions::new()).contains("JIS code: 3235 (乙)\n"));

    dic.close();
    let out = dic.format(&kou, &FormatOptions::new());
    assert!(out.contains("JIS code: 3235\n"), "{}", out);
    assert!(!out.contains("(乙)"));
}

fn open_text(name: &str, content: &str) -> (tempfile::TempDir, Kanjidic) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();

    let mut dic = Kanjidic::new();
    dic.open_with(&path, &utf8())
        .unwrap_or_else(|e| panic!("failed to open {}: {}", name, e));
    (dir, dic)
}

#[test]
fn an_entry_never_resolves_to_itself() {
    let (_dir, dic) = open_text("self.utf8", "甲 3943 XJ3943\n");
    let stored = dic.get("甲").unwrap().unwrap();
    let copy = stored.clone();

    let from_store = dic.format(stored, &FormatOptions::new());
    let from_copy = dic.format(&copy, &FormatOptions::new());
    assert!(from_store.contains("JIS code: 3943\n"), "{}", from_store);
    assert_eq!(from_store, from_copy, "equal entries must format identically");
}

#[test]
fn misclassification_resolves_on_the_qualified_key() {
    let (_dir, dic) = open_text(
        "misclassified.utf8",
        "甲 3943 ZSP1-4-3\n乙 3235 S1-4-3\n丙 4231 P1-4-3\n",
    );
    let kou = dic.get("甲").unwrap().unwrap();
    let out = dic.format(kou, &FormatOptions::new().hide(keys::JIS_CODE));
    assert!(
        out.contains("Mis-classification code:\n  Stroke count: 1-4-3 (乙)\n"),
        "missing resolution:\n{}",
        out
    );
}

#[test]
fn misclassification_ignores_other_keys_with_the_same_value() {
    let (_dir, dic) = open_text("skip_only.utf8", "甲 3943 ZSP1-4-3\n丙 4231 P1-4-3\n");
    let kou = dic.get("甲").unwrap().unwrap();
    let out = dic.format(kou, &FormatOptions::new().hide(keys::JIS_CODE));
    assert!(
        out.contains("Mis-classification code:\n  Stroke count: 1-4-3\n"),
        "{}",
        out
    );
    assert!(!out.contains("(丙)"), "{}", out);
}

#[test]
fn format_all_joins_entries_with_a_line_break() {
    let dic = open_sample();
    let options = FormatOptions::new()
        .rank(keys::CHARACTER, 0)
        .hide(keys::JIS_CODE)
        .hide(keys::DICTIONARIES);
    let entries = [parse("亜 3021 S7"), parse("乙 3235 S1")];
    assert_eq!(
        dic.format_all(&entries, &options),
        "Character: 亜\nStroke count: 7\n\nCharacter: 乙\nStroke count: 1\n"
    );
}

#[test]
fn display_uses_the_summary_view() {
    let kanji = parse("畑 4829 S9 はた {(kokuji)} {field}");
    assert_eq!(
        kanji.to_string(),
        "Character: 畑\n\
         Reading: はた\n\
         Meaning: (kokuji), field\n\
         JIS code: 4829\n\
         Stroke count: 9\n\
         Original Japanese character (国字): true"
    );
}
