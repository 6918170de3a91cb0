#[macro_use]
mod common;

#[cfg(test)]
mod if_stmt {
    tests! {
        branches in if_stmt is OK
        "then"
        "else"
    }

    tests! {
        truthiness in if_stmt is OK
        "zero"
        "empty"
        "nil is falsy"
    }

    tests! {
        dangling_else in if_stmt is OK
        "inner else"
    }
}
