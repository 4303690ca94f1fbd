mod recovery_scanner_test;
