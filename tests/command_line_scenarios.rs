// tests/command_line_scenarios.rs — Integration test: -add, -list and errors
//
// Drives the command line against an in-memory 64-bit registry and compares
// the resulting registry snapshot with what each scenario should produce.

mod common;

use common::*;
use filemeta_assoc::reg_state::RegState;
use filemeta_assoc::saved_state::SavedState;
use filemeta_assoc::usage;





fn add(name: &str, args: &str, initial: Option<RegState>, expected: RegState) -> Harness {
    let h = Harness::new();
    if let Some(initial) = initial {
        h.zap(&initial);
    }

    let (code, out) = h.invoke(&format!("-a {} {}", args, TEST_EXT));
    assert_eq!(code, 0, "add failed for {}", name);
    assert_eq!(out, format!("{}\n", usage::handler_added_ok(TEST_EXT)), "{}", name);
    assert_eq!(h.read(), expected, "add produced the wrong state for {}", name);
    h
}





////////////////////////////////////////////////////////////////////////////////
//
//  add_with_builtin_and_custom_profiles
//
//  Verifies new, minimal, and pre-handled extensions end up in the
//  current layout.
//
////////////////////////////////////////////////////////////////////////////////

#[test]
fn add_with_builtin_and_custom_profiles() {
    add("V15BuiltIn", "-p=simple", None, v15_builtin());

    let minimal = Harness::new();
    RegState::create_minimal_extension(&minimal.reg, TEST_EXT).unwrap();
    assert_eq!(minimal.invoke(&format!("-a -p=Simple {}", TEST_EXT)).0, 0);
    assert_eq!(minimal.read(), v15_builtin());

    add("V15CustomTest",        "-p=test -d={defs}", None,                        v15_custom_test());
    add("V15CustomTestOther32", "-p=test -d={defs}", Some(v15_initial_other32()), v15_custom_test_other32());
    add("V15CustomTestOther64", "-p=test -d={defs}", Some(v15_initial_other64()), v15_custom_test_other64());
}





////////////////////////////////////////////////////////////////////////////////
//
//  add_extends_foreign_handler
//
//  Verifies the foreign handler is chained in both views and its display
//  values are hidden wherever they were.
//
////////////////////////////////////////////////////////////////////////////////

#[test]
fn add_extends_foreign_handler() {
    let h = add("V15ExtendedBmp", "-p=.bmp -d={defs}", Some(v15_unextended()), v15_extended_bmp());

    let stored = SavedState::load(h.store_path()).unwrap();
    assert!(stored.custom_profiles.iter().any(|p| p.name == ".bmp"));

    add("V15ExtendedBmpClsid", "-p=.bmp -d={defs}", Some(v15_unextended_clsid()), v15_extended_bmp_clsid());
    add("V15ExtendedBmpBoth",  "-p=.bmp -d={defs}", Some(v15_unextended_both()),  v15_extended_bmp_both());
}





////////////////////////////////////////////////////////////////////////////////
//
//  merge_tiny_into_foreign_handler
//
//  Verifies -m folds the foreign values and the tiny profile into a
//  profile named after the extension, and that removal puts everything
//  back.
//
////////////////////////////////////////////////////////////////////////////////

#[test]
fn merge_tiny_into_foreign_handler() {
    let h = add("V15ExtendedTiny", "-m -p=tiny -d={defs}", Some(v15_unextended_tiny()), v15_extended_tiny());

    let stored = SavedState::load(h.store_path()).unwrap();
    let merged = stored.custom_profiles.iter().find(|p| p.name == TEST_EXT).unwrap();
    assert_eq!(merged.info_tip_string(), "prop:System.Description;System.Comment");

    let (code, out) = h.invoke("-l");
    assert_eq!(code, 0);
    assert_eq!(out, format!("{:<5}\t{:<12}\tFile Meta + {}\n", TEST_EXT, TEST_EXT, OTHER_GUID));

    assert_eq!(h.invoke(&format!("-r {}", TEST_EXT)).0, 0);
    assert_eq!(h.read(), v15_unextended_tiny());
}





#[test]
fn merge_by_default_from_config() {
    let mut h = Harness::new();
    h.config.merge = Some(true);
    h.zap(&v15_unextended_tiny());

    assert_eq!(h.invoke(&format!("-a -p=tiny -d={{defs}} {}", TEST_EXT)).0, 0);
    assert_eq!(h.read(), v15_extended_tiny());
}





////////////////////////////////////////////////////////////////////////////////
//
//  list_shows_handlers
//
//  Verifies only extensions with our handler are listed, built-in
//  profiles are recognised, and unbound ones print <None>.
//
////////////////////////////////////////////////////////////////////////////////

#[test]
fn list_shows_handlers() {
    let h = Harness::new();
    assert_eq!(h.invoke("-a -p=Simple .fma").0, 0);
    assert_eq!(h.invoke("-a -p=test -d={defs} .fmc").0, 0);

    let mut orphaned = v14_custom_test();
    orphaned.system.custom_profile = Some("gone".to_string());
    h.zap(&orphaned);

    let (code, out) = h.invoke("--list");
    assert_eq!(code, 0);
    assert_eq!(
        out,
        format!(
            ".fma \tSimple      \tFile Meta Property Handler\n\
             .fmc \ttest        \tFile Meta Property Handler\n\
             .FMfoo\t{:<12}\tFile Meta Property Handler\n",
            usage::NULL_PROFILE,
        )
    );
}





////////////////////////////////////////////////////////////////////////////////
//
//  error_conditions
//
//  Verifies each malformed command line fails with the expected code and
//  leaves the registry alone.
//
////////////////////////////////////////////////////////////////////////////////

#[test]
fn error_conditions() {
    let h = Harness::new();

    let cases = [
        ("No arguments at all",                 String::new(),                              87),
        ("Bad command",                         "-x".to_string(),                           87),
        ("Two commands",                        "-a -r".to_string(),                        87),
        ("Remove without an extension",         "-r".to_string(),                           87),
        ("Remove with a bad extension",         "-r nosuch".to_string(),                    87),
        ("Remove with a non-existent extension", format!("-r {}", TEST_EXT),                87),
        ("Add without an extension",            "-a".to_string(),                           87),
        ("Add without a profile",               format!("-a {}", TEST_EXT),                 87),
        ("Add with a bad profile",              format!("-a -p=nosuch {}", TEST_EXT),       87),
        ("Add with a bad profile and defs",     format!("-a -p=nosuch -d={{defs}} {}", TEST_EXT), 87),
        ("Add with missing definitions",        format!("-a -p=test -d=nosuch.xml {}", TEST_EXT), 2),
    ];

    for (description, args, expected) in cases {
        assert_eq!(h.invoke(&args).0, expected, "{}", description);
    }

    assert_eq!(h.read(), RegState::default());
}





#[test]
fn not_elevated_fails_with_access_denied() {
    let mut h = Harness::new();
    h.host.elevated = false;
    h.zap(&v15_builtin());

    assert_eq!(h.invoke(&format!("-r {}", TEST_EXT)).0, 5);
    assert_eq!(h.read(), v15_builtin());

    assert_eq!(h.invoke("-a -p=Simple .fmnew").0, 5);
}
