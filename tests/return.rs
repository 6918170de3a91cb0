#[macro_use]
mod common;

#[cfg(test)]
mod return_stmt {
    tests! {
        top_level in return_stmt is ERR 65
        "[line 1] Error at 'return': Cannot return from top-level code"
    }
}
