#[macro_use]
mod common;

#[cfg(test)]
mod super_expr {
    tests! {
        method_call in super_expr is OK
        "AB"
    }

    tests! {
        in_initializer in super_expr is OK
        "ab"
    }

    tests! {
        undefined_method in super_expr is ERR 70
        "Undefined property 'missing' [line 4]"
    }

    tests! {
        no_superclass in super_expr is ERR 65
        "[line 3] Error at 'super': Cannot use 'super' in a class with no superclass"
    }

    tests! {
        top_level in super_expr is ERR 65
        "[line 1] Error at 'super': Cannot use 'super' outside of a class"
    }
}
