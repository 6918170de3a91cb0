#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        scoping in variable is OK
        "2"
        "1"
    }

    tests! {
        assignment_value in variable is OK
        "2"
        "2"
    }

    tests! {
        forward_global_in_function in variable is OK
        "later"
    }

    tests! {
        undefined in variable is ERR 70
        "Undefined variable 'a' [line 1]"
    }

    tests! {
        undefined_assignment in variable is ERR 70
        "Undefined variable 'a' [line 1]"
    }

    tests! {
        own_initializer in variable is ERR 65
        "[line 1] Error at 'a': Cannot read local variable in its own initializer"
    }

    tests! {
        redeclaration in variable is ERR 65
        "[line 1] Error at 'a': A variable is already defined with name 'a' in this scope"
    }
}
