mod common;

#[cfg(test)]
mod resolver_tests {
    use crate::common::session;

    #[test]
    fn redeclaring_a_local() {
        let mut lox = session();

        lox.must_fail_resolving(
            "{var a = 1; var a = 2; print a;}",
            "[line 1] Error at a: Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn duplicate_parameters() {
        let mut lox = session();

        lox.must_fail_resolving(
            "fun f(a, a) {}",
            "[line 1] Error at a: Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn reading_a_local_in_its_own_initialiser() {
        let mut lox = session();

        lox.must_fail_resolving(
            "var name = 1; { var name = name; print name; }",
            "[line 1] Error at name: Can't read local variable in its own initialiser.",
        );
    }

    #[test]
    fn return_outside_a_function() {
        let mut lox = session();

        lox.must_fail_resolving("return nil;", "[line 1] Error at return: Can't return from top-level code.");
        lox.must_fail_resolving("{\n  return;\n}", "[line 2] Error at return: Can't return from top-level code.");
    }

    #[test]
    fn unused_locals() {
        let mut lox = session();

        lox.must_fail_resolving("{var a = 1;}", "[line 1] Error at a: Variable is never used.");
        lox.must_fail_resolving("{ var a = 1; } print a;", "[line 1] Error at a: Variable is never used.");
        lox.must_fail_resolving(
            "fun f() {\n  var first;\n  var second;\n}",
            "[line 2] Error at first: Variable is never used.\n\
             [line 3] Error at second: Variable is never used.",
        );
        lox.must_fail_resolving(
            "{ fun helper() {} class Local {} }",
            "[line 1] Error at helper: Variable is never used.\n\
             [line 1] Error at Local: Variable is never used.",
        );
    }

    #[test]
    fn unused_globals_and_parameters_are_fine() {
        let mut lox = session();

        lox.must_evaluate_to("var neverRead = 1;", "");
        lox.must_evaluate_to("fun ignoresArgs(first, second) {} ignoresArgs(1, 2);", "nil");
        lox.must_evaluate_to("class NoThis { m() { return 1; } } NoThis().m();", "1");
    }

    #[test]
    fn assignment_counts_as_use() {
        let mut lox = session();

        lox.must_evaluate_to("{ var a; a = 1; }", "1");
    }

    #[test]
    fn every_error_is_reported() {
        let mut lox = session();

        lox.must_fail_resolving(
            "return 1;\nprint this;\n{ var a = 1; var a = 2; }",
            "[line 1] Error at return: Can't return from top-level code.\n\
             [line 2] Error at this: Can't use 'this' outside of a class.\n\
             [line 3] Error at a: Already a variable with this name in this scope.\n\
             [line 3] Error at a: Variable is never used.",
        );
    }

    #[test]
    fn shadowing_resolves_to_the_nearest_declaration() {
        let mut lox = session();

        let source = r#"var a = "outer";
{
  var a = "inner";
  {
    var b = a;
    print b;
  }
  print a;
}
print a;"#;

        lox.must_evaluate_to(source, "");
        lox.must_have_printed(&["inner", "inner", "outer"]);
    }

    #[test]
    fn resolution_survives_across_runs() {
        let mut lox = session();

        lox.must_evaluate_to("fun add(a, b) { var sum = a + b; return sum; }", "");
        lox.must_evaluate_to("{ var x = 1; var y = 2; add(x, y); }", "3");
        lox.must_evaluate_to("add(10, 20);", "30");
    }
}
