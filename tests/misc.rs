#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        native_clock in misc is OK
        "true"
        "<native fn clock>"
    }

    tests! {
        multiple_scan_errors in misc is ERR 65
        "[line 1] Error: Unexpected character: @"
        "[line 1] Error: Unexpected character: #"
    }

    tests! {
        parse_recovery in misc is ERR 65
        "[line 1] Error at ';': Expect expression"
        "[line 2] Error at ';': Expect expression"
    }
}
