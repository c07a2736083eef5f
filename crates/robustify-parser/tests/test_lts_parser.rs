//! Integration tests for the `.lts` parser.

/// These tests check whether the benchmark files are accepted by the parser.
#[cfg(test)]
mod parse_lts_files {
    use std::{env, fs};

    use robustify_parser::{ParseLTS, lts_format::LTSParser};
    use walkdir::WalkDir;

    const BENCHMARK_FOLDER: &str = "../../benchmarks";

    /// This test will try to find all `.lts` files recursively in the
    /// `BENCHMARK_FOLDER` folder.
    /// It does not check for correctness of the parsed automaton but only that
    /// the parser does accept the file.
    #[test]
    fn test_all_benchmarks_can_be_parsed() {
        println!("Start {}", env::current_dir().unwrap().display());

        let mut n_parsed = 0;
        for entry in WalkDir::new(BENCHMARK_FOLDER)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let f_name = entry.file_name().to_string_lossy();

            if f_name.ends_with(".lts") {
                println!("Checking file {f_name}");

                let input = fs::read_to_string(entry.path()).unwrap_or_else(|err| {
                    panic!(
                        "Failed to read file {}: {}",
                        entry.path().to_string_lossy(),
                        err
                    )
                });

                LTSParser::new().parse_lts(&input).unwrap_or_else(|err| {
                    panic!(
                        "Failed to parse file {}: {:?}",
                        entry.path().to_string_lossy(),
                        err
                    )
                });
                n_parsed += 1;
            }
        }

        assert!(n_parsed > 0, "No benchmark files found");
    }
}

/// Automata written by the writer can be read again
#[cfg(test)]
mod parse_written_lts {
    use robustify_lts::{builder::LTSBuilder, writer::into_lts_format};
    use robustify_parser::{ParseLTS, lts_format::LTSParser};

    #[test]
    fn test_completed_environment_is_parsed_back() {
        let env = LTSBuilder::new("env")
            .with_actions(["w.enter", "w.exit"])
            .unwrap()
            .with_states(3)
            .with_accepting([0, 1])
            .unwrap()
            .with_transitions([(0, "w.enter", 1), (1, "w.exit", 0), (1, "w.enter", 2)])
            .unwrap()
            .build()
            .unwrap();
        let full = env.completed();

        let parsed = LTSParser::new()
            .parse_lts(&into_lts_format(&full))
            .unwrap();
        assert_eq!(parsed, full);
    }
}
