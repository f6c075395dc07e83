mod xes_import_tests;
