/// Runs a fixture script from tests/target and checks what it does.
///
/// The OK form runs the script in process and compares the captured program
/// output line by line. The ERR form spawns the real binary so that it can
/// also check the exit code the script dies with, along with its stderr.
#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use flint_lang::flint;

            let mut expected = vec![$($expected),*];

            // if exists, concat expected lines with new lines
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    // add empty string to end to add new line to end of output
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output = Vec::new();
            let mut flint = flint::new(&mut output);

            flint.run_file(format!("tests/target/{}/{}.flint", stringify!($scope), stringify!($file)));

            // drop flint here to release the borrow before reading output
            drop(flint);
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR $code:literal $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            // expected stderr lines joined with new lines
            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/target/{}/{}.flint", stringify!($scope), stringify!($file));

            Command::cargo_bin("flint").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .code($code);
        }
    };
}
